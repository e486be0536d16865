pub mod evaluation_service;
pub mod evaluation_session;
pub mod evaluator_client;
pub mod feedback_detail;
pub mod result_classifier;
pub mod score_summary;
