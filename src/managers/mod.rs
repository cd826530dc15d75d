// keydeck state managers
// Managers own stateful views: the key collection and the signed-in session.

pub mod key_manager;
pub mod session_manager;
