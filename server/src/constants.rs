// Shared constants for server ports and timing.

pub const DSU_UDP_PORT: u16 = 26_760;
pub const HTTP_PORT: u16 = 8080;
pub const SWEEP_INTERVAL_MS: u64 = 5_000;
pub const RECV_BUFFER_LEN: usize = 2_048;
