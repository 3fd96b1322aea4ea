/// Half-close direction for a connection-oriented socket.
///
/// Grounded on `spark_core::transport::ShutdownDirection` (itself a
/// re-export bridging to `spark_transport::ShutdownDirection`) — kept as a
/// single owning definition here since this workspace has no cross-crate
/// re-export cycle to break.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShutdownDirection {
    Read,
    Write,
    Both,
}
