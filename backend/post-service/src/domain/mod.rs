/// Post aggregate domain
///
/// - `ids`: typed identifiers and the identifier validator
/// - `models`: Post, Comment, Reply and their populated views
/// - `guard`: ownership checks
/// - `likes`: idempotent like set
/// - `thread`: comment and reply management
///
/// Nothing in here suspends; the engine in `services` does the I/O.
pub mod guard;
pub mod ids;
pub mod likes;
pub mod models;
pub mod thread;

pub use ids::{is_valid_id, CommentId, PostId, ReplyId, UserId};
pub use models::{Comment, CommentView, ImageRef, Post, PostView, Reply, ReplyView, UserSummary};
