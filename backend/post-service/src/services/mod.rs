/// Business logic layer
///
/// - `posts`: the Post aggregate engine (load, check, mutate, persist)
pub mod posts;

pub use posts::PostEngine;
