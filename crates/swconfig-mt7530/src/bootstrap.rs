//! One-shot correction of the hardware trap register.
//!
//! Some boot loaders leave HWTRAP with strapping values the firmware does not
//! expect. The MT7530 needs it restored before it forwards reliably.

use tracing::{debug, info};

use crate::regs;
use crate::transport::RegisterTransport;

/// Rewrites HWTRAP when it differs from the expected value.
///
/// Returns true if the register was rewritten.
pub fn fixup_hwtrap<T: RegisterTransport>(t: &mut T) -> bool {
    let current = t.read(regs::HWTRAP);
    if current == regs::HWTRAP_MAGIC {
        debug!("HWTRAP already set");
        return false;
    }

    info!(
        found = format_args!("{:#010x}", current),
        expected = format_args!("{:#010x}", regs::HWTRAP_MAGIC),
        "Fixing up HWTRAP register - bootloader probably played with it"
    );
    t.write(regs::HWTRAP, regs::HWTRAP_MAGIC);
    true
}
