pub mod bootstrap;
pub mod loader;
pub mod provision;

pub use crate::domain::model::{
    Domain, DomainSpec, Offering, Score, ScoreSpec, Sentiment, Tag, TagSet,
};
pub use crate::domain::ports::{DefaultSpecSource, SpecDatabase, SpecStore, ViewOptions};
pub use crate::utils::error::Result;
