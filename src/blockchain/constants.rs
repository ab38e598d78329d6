//! Protocol constants used for limit defaults and fee accounting.

/// Hard gas ceiling of a single block.
pub const MAX_GAS_PER_BLOCK: u64 = 2_600_000;

/// Gas limit assigned to transactions and originations until simulation
/// replaces it with the consumed amount.
pub const GAS_LIMIT_PLACEHOLDER: u64 = 1_040_000;

/// Storage limit assigned to transactions and originations until simulation
/// replaces it with the paid storage.
pub const STORAGE_LIMIT_PLACEHOLDER: u64 = 60_000;

/// Fee value marking an operation whose fee still has to be computed.
pub const FEE_PLACEHOLDER: u64 = 0;

/// Gas limit for caller-supplied reveal and delegation operations.
pub const DEFAULT_GAS_LIMIT: u64 = 10_300;

/// Storage limit for caller-supplied reveal and delegation operations.
pub const DEFAULT_STORAGE_LIMIT: u64 = 0;

/// Storage limit for a transaction funding an empty implicit account.
pub const ALLOCATION_STORAGE_LIMIT: u64 = 300;

pub const REVEAL_GAS_LIMIT: u64 = 10_000;
pub const REVEAL_STORAGE_LIMIT: u64 = 0;
pub const REVEAL_FEE: u64 = 1_300;

/// Base fee of an operation group, in mutez.
pub const MINIMAL_FEE: u64 = 100;

/// Fee per forged byte, in mutez.
pub const MINIMAL_FEE_PER_BYTE: u64 = 1;

/// Fee per gas unit, in nanotez (0.1 mutez).
pub const MINIMAL_NANOTEZ_PER_GAS_UNIT: u64 = 100;

pub const NANOTEZ_PER_MUTEZ: u64 = 1_000;

/// Flat margin added on top of the computed fee, in mutez.
pub const FEE_SAFETY_MARGIN: u64 = 100;

/// Storage burned for every contract an operation originates.
pub const ORIGINATION_BURN: u64 = 257;

/// Storage burned when an operation allocates its destination.
pub const ALLOCATION_BURN: u64 = 257;

pub const MILLIGAS_PER_GAS: u64 = 1_000;

/// Length of a hex-encoded ed25519 signature.
pub const HEX_SIGNATURE_LENGTH: usize = 128;

/// Signature attached to simulated operations. The node does not check it.
pub const DUMMY_SIGNATURE: &str =
    "sigUHx32f9wesZ1n2BWpixXz4AQaZggEtchaQNHYGRCoWNAXx45WGW2ua3apUUUAGMLPwAU41QoaFCzVSL61VaessLg4YbbP";

/// Watermark prepended to forged operation groups before signing.
pub const OPERATION_WATERMARK: u8 = 0x03;

/// BIP32 derivation path the host derives the signing entropy for.
pub const DERIVATION_PATH: [&str; 5] = ["m", "44'", "1729'", "0'", "0'"];
