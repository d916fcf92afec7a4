//! # Debug Message Injection
//!
//! [`debug_message!`](crate::debug_message) embeds a message for the emulator's
//! debug console directly in the instruction stream.
//!
//! ## Build switch
//!
//! The `debug-messages` Cargo feature turns emission on. It only has an effect
//! when compiling for 32-bit ARM (`target_arch = "arm"`), the only target the
//! console exists for. In every other configuration the macro expands to a
//! `const` check and nothing else: no instructions, no data.
//!
//! ## Emitted sequence
//!
//! ```text
//!     mov   r12, r12              ; console trigger, architecturally a no-op
//!     b     2f                    ; skip the payload
//!     .short 0x6464
//!     .short 0
//!     .asciz "%frame%: <text>"
//!     .balign 4, 0
//! 2:
//! ```
//!
//! `2:` is an assembler local label and `2f` binds to the nearest following
//! definition, so any number of invocations in one function, or one function
//! inlined many times, never collide. (Named labels are rejected in Rust inline
//! assembly for exactly that reason.)
//!
//! The block is declared `nomem, nostack, preserves_flags`: during normal
//! execution only the no-op `mov` and the branch run, and the payload bytes are
//! never reached.
//!
//! ## Restrictions on the text
//!
//! The argument must be a string literal without `"`, `\`, `{`, `}`, NUL, or
//! line breaks (see [`check_injectable`](crate::message::check_injectable)).
//! Violations are compile errors in every configuration:
//!
//! ```rust,compile_fail
//! regsnap_core::debug_message!("{x}");
//! ```
//!
//! ```rust,compile_fail
//! regsnap_core::debug_message!("say \"hi\"");
//! ```
//!
//! The macro needs nothing from `std`, so `#![no_std]` crates can use it with
//! `default-features = false`.

/// Embed a debug-console message at this point in the code.
///
/// ```rust
/// fn boot()
/// {
///     regsnap_core::debug_message!("entering boot");
///     // ...
///     regsnap_core::debug_message!("boot done");
/// }
/// # boot();
/// ```
#[cfg(all(feature = "debug-messages", target_arch = "arm"))]
#[macro_export]
macro_rules! debug_message {
    ($text:literal) => {{
        const _: () = $crate::message::check_injectable($text);
        // SAFETY: the branch skips the data directives, so only the register-to-itself
        // `mov` executes; no register, flag, memory, or stack state changes.
        unsafe {
            ::core::arch::asm!(
                "mov r12, r12",
                "b 2f",
                ".short 0x6464",
                ".short 0",
                concat!(".asciz \"%frame%: ", $text, "\""),
                ".balign 4, 0",
                "2:",
                options(nomem, nostack, preserves_flags)
            );
        }
    }};
}

/// Embed a debug-console message at this point in the code.
///
/// This build has emission disabled: the invocation only validates the text at
/// compile time and generates no code.
///
/// ```rust
/// fn boot()
/// {
///     regsnap_core::debug_message!("entering boot");
///     // ...
///     regsnap_core::debug_message!("boot done");
/// }
/// # boot();
/// ```
#[cfg(not(all(feature = "debug-messages", target_arch = "arm")))]
#[macro_export]
macro_rules! debug_message {
    ($text:literal) => {{
        const _: () = $crate::message::check_injectable($text);
    }};
}

/// `true` when [`debug_message!`](crate::debug_message) emits stubs in this build.
pub const ENABLED: bool = cfg!(all(feature = "debug-messages", target_arch = "arm"));
