//! Session registry for concurrent callers.

use discform_core::{AnalysisConfig, Error, Frame, Result, SessionId};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::scorer::AnalysisOutcome;
use crate::session::AnalysisSession;

/// Throw analyzer holding one [`AnalysisSession`] per recording
pub struct ThrowAnalyzer {
    config: AnalysisConfig,
    /// Live sessions
    sessions: RwLock<HashMap<SessionId, AnalysisSession>>,
    /// Last finalized outcome per session
    outcomes: RwLock<HashMap<SessionId, AnalysisOutcome>>,
}

impl ThrowAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sessions: RwLock::new(HashMap::new()),
            outcomes: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Open a session for a recording of `duration` seconds
    pub async fn start_session(&self, duration: f64) -> Result<SessionId> {
        let session = AnalysisSession::new(self.config.clone(), duration)?;
        let id = SessionId::new();

        let mut sessions = self.sessions.write().await;
        sessions.insert(id, session);

        tracing::info!("Started session {:?} ({:.2}s)", id, duration);
        Ok(id)
    }

    pub async fn process_frame(&self, id: SessionId, frame: Frame) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(Error::UnknownSession(id))?;
        session.process_frame(frame)
    }

    /// Finalize a session and cache its outcome
    pub async fn finalize(&self, id: SessionId) -> Result<AnalysisOutcome> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or(Error::UnknownSession(id))?;
        let outcome = session.finalize();

        let mut outcomes = self.outcomes.write().await;
        outcomes.insert(id, outcome.clone());

        Ok(outcome)
    }

    /// Cached outcome from the last finalize
    pub async fn get_outcome(&self, id: SessionId) -> Option<AnalysisOutcome> {
        let outcomes = self.outcomes.read().await;
        outcomes.get(&id).cloned()
    }

    /// Start a session over, dropping its frames and cached outcome
    pub async fn reset_session(&self, id: SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let mut outcomes = self.outcomes.write().await;

        let session = sessions.get_mut(&id).ok_or(Error::UnknownSession(id))?;
        session.reset();
        outcomes.remove(&id);
        Ok(())
    }

    pub async fn end_session(&self, id: SessionId) {
        let mut sessions = self.sessions.write().await;
        let mut outcomes = self.outcomes.write().await;
        sessions.remove(&id);
        outcomes.remove(&id);
    }

    pub async fn active_sessions(&self) -> Vec<SessionId> {
        let sessions = self.sessions.read().await;
        sessions.keys().copied().collect()
    }
}

impl Default for ThrowAnalyzer {
    fn default() -> Self {
        Self {
            config: AnalysisConfig::default(),
            sessions: RwLock::new(HashMap::new()),
            outcomes: RwLock::new(HashMap::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tests::standing_frame;

    #[tokio::test]
    async fn test_analyzer_workflow() {
        let analyzer = ThrowAnalyzer::default();
        let id = analyzer.start_session(2.0).await.unwrap();

        for i in 0..20 {
            analyzer
                .process_frame(id, standing_frame(i as f64 * 0.1))
                .await
                .unwrap();
        }

        assert!(analyzer.get_outcome(id).await.is_none());
        let outcome = analyzer.finalize(id).await.unwrap();
        assert_eq!(outcome.result().unwrap().frames_analyzed, 20);

        // Cached
        let cached = analyzer.get_outcome(id).await;
        assert_eq!(cached, Some(outcome));

        // Reset
        analyzer.reset_session(id).await.unwrap();
        assert!(analyzer.get_outcome(id).await.is_none());
        assert!(analyzer.finalize(id).await.unwrap().is_undetectable());

        // End
        analyzer.end_session(id).await;
        assert!(analyzer.active_sessions().await.is_empty());
        assert_eq!(
            analyzer.process_frame(id, standing_frame(0.0)).await,
            Err(Error::UnknownSession(id))
        );
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let analyzer = ThrowAnalyzer::default();
        let a = analyzer.start_session(1.0).await.unwrap();
        let b = analyzer.start_session(1.0).await.unwrap();

        analyzer.process_frame(a, standing_frame(0.5)).await.unwrap();
        // Same timestamp is fine in another session
        analyzer.process_frame(b, standing_frame(0.5)).await.unwrap();
        assert!(analyzer.process_frame(a, standing_frame(0.4)).await.is_err());

        assert_eq!(analyzer.active_sessions().await.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_duration_is_rejected() {
        let analyzer = ThrowAnalyzer::new(AnalysisConfig::default()).unwrap();
        assert_eq!(
            analyzer.start_session(-1.0).await,
            Err(Error::InvalidDuration(-1.0))
        );
        assert!(analyzer.active_sessions().await.is_empty());
    }
}
