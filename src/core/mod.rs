pub mod agent;
pub mod chain;
pub mod itinerary;
pub mod prompt;
pub mod recommendation;

pub use crate::domain::model::{ChatMessage, Recommendation, StepResult, TravelMode};
pub use crate::domain::ports::{ChatModel, ConfigProvider};
pub use crate::utils::error::Result;
