// One service per area of the store. Each owns a database handle and a
// thiserror enum mapped onto the shared taxonomy in `crate::error`.
//
// Writes with side effects (enrollment, content fan-out, comment
// notifications, cascading deletes) run inside a single transaction so the
// primary mutation and its extensions commit or fail together.

pub mod accounts;
pub mod comments;
pub mod materials;
pub mod notifications;
pub(crate) mod notify;
pub mod playlists;
pub mod rooms;
pub mod videos;
