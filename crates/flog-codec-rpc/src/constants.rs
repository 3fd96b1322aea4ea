//! ONC-RPC wire-format constants, ported verbatim from the original's
//! numeric literals (`oncrpc_message.cpp`, `oncrpc_request.cpp`,
//! `oncrpc_response.cpp`).

/// A call message (`msg_type` field).
pub const MSG_CALL: u32 = 0;
/// A reply message (`msg_type` field).
pub const MSG_REPLY: u32 = 1;
/// `reply_stat`: the call was accepted (a further `accept_stat` follows).
pub const MSG_ACCEPTED: u32 = 0;
/// `reply_stat`: the call was rejected outright (no `accept_stat`).
pub const MSG_REJECTED: u32 = 1;
/// The only auth flavor this workspace's façades emit or expect.
pub const AUTH_NONE: u32 = 0;
/// The ONC-RPC protocol version this codec speaks (`rpcvers` field).
pub const RPC_VERSION: u32 = 2;

/// `accept_stat` values.
pub mod accept_stat {
    pub const SUCCESS: u32 = 0;
    pub const PROG_UNAVAIL: u32 = 1;
    pub const PROG_MISMATCH: u32 = 2;
    pub const PROC_UNAVAIL: u32 = 3;
    pub const GARBAGE_ARGS: u32 = 4;
    pub const SYSTEM_ERR: u32 = 5;
}

/// The fixed exception text for `accept_stat` 1..5. Returns `None` for
/// `SUCCESS` or any value outside the fixed set — the caller (or, for an
/// unmapped custom value, the serving interface) decides what to do with
/// those.
pub fn exception_message(stat: u32) -> Option<&'static str> {
    match stat {
        accept_stat::PROG_UNAVAIL => Some("program unavailable"),
        accept_stat::PROG_MISMATCH => Some("program mismatch"),
        accept_stat::PROC_UNAVAIL => Some("procedure unavailable"),
        accept_stat::GARBAGE_ARGS => Some("garbage arguments"),
        accept_stat::SYSTEM_ERR => Some("system error"),
        _ => None,
    }
}

/// `prog = 0x2000_0000 + interface_tag`.
pub fn program_id(interface_tag: u32) -> u32 {
    0x2000_0000 + interface_tag
}

/// `vers = interface_tag`.
pub fn version_id(interface_tag: u32) -> u32 {
    interface_tag
}

/// `proc = body_tag`.
pub fn procedure_id(body_tag: u32) -> u32 {
    body_tag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_id_offsets_the_interface_tag() {
        assert_eq!(program_id(7), 0x2000_0007);
    }

    #[test]
    fn exception_message_covers_the_fixed_range_only() {
        assert_eq!(exception_message(accept_stat::SUCCESS), None);
        assert_eq!(exception_message(accept_stat::PROG_UNAVAIL), Some("program unavailable"));
        assert_eq!(exception_message(accept_stat::SYSTEM_ERR), Some("system error"));
        assert_eq!(exception_message(6), None);
    }
}
