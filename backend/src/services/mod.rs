pub mod identity;
pub mod media;

pub use identity::{Identity, IdentityProvider, Session, SupabaseAuth};
pub use media::{MediaStore, SupabaseStorage, picture_path};
