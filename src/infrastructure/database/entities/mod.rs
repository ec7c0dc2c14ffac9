//! Database entities module

pub mod post;
pub mod post_tag;
pub mod tag;
pub mod user;

pub use post::Entity as Post;
pub use post_tag::Entity as PostTag;
pub use tag::Entity as Tag;
pub use user::Entity as User;
