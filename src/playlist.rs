//! Named playlists.
//!
//! [`PlaylistManager`] holds the playlists loaded in memory and the cursor of
//! the active one. [`PlaylistStore`] persists them as one JSON record per
//! playlist in a directory.

mod manager;
mod model;
mod store;

pub use manager::PlaylistManager;
pub use model::Playlist;
pub use store::PlaylistStore;

#[cfg(test)]
mod tests;
