//! Script opcodes.
//!
//! Only the opcodes needed to recognize and build the standard output templates are named here;
//! any other byte is still a valid [Opcode] value.
#![allow(non_upper_case_globals)]

use std::fmt;

/// A single script opcode.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Opcode(u8);

impl Opcode {
    /// The byte value of the opcode.
    pub const fn to_u8(self) -> u8 {
        self.0
    }

    /// Returns the number pushed by `OP_1` through `OP_16`, if this is one of them.
    pub fn small_int(self) -> Option<u8> {
        if self.0 >= OP_1.0 && self.0 <= OP_16.0 {
            Some(self.0 - OP_1.0 + 1)
        } else {
            None
        }
    }

    /// Returns the opcode pushing the number `n`, for `0..=16`.
    pub fn from_small_int(n: u8) -> Option<Opcode> {
        match n {
            0 => Some(OP_0),
            1..=16 => Some(Opcode(OP_1.0 + n - 1)),
            _ => None,
        }
    }
}

impl From<u8> for Opcode {
    fn from(value: u8) -> Self {
        Opcode(value)
    }
}

impl From<Opcode> for u8 {
    fn from(value: Opcode) -> Self {
        value.0
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            OP_0 => "OP_0",
            OP_PUSHDATA1 => "OP_PUSHDATA1",
            OP_PUSHDATA2 => "OP_PUSHDATA2",
            OP_PUSHDATA4 => "OP_PUSHDATA4",
            OP_1NEGATE => "OP_1NEGATE",
            OP_RETURN => "OP_RETURN",
            OP_DUP => "OP_DUP",
            OP_EQUAL => "OP_EQUAL",
            OP_EQUALVERIFY => "OP_EQUALVERIFY",
            OP_HASH160 => "OP_HASH160",
            OP_CHECKSIG => "OP_CHECKSIG",
            OP_CHECKMULTISIG => "OP_CHECKMULTISIG",
            op if op.small_int().is_some() => {
                return write!(f, "OP_{}", op.0 - OP_1.0 + 1);
            }
            op if op.0 < OP_PUSHDATA1.0 => return write!(f, "OP_PUSHBYTES_{}", op.0),
            op => return write!(f, "OP_UNKNOWN({:#04x})", op.0),
        };
        f.write_str(name)
    }
}

/// Pushes an empty byte sequence onto the stack.
pub const OP_0: Opcode = Opcode(0x00);
/// The next byte sets the number of bytes to push onto the stack
pub const OP_PUSHDATA1: Opcode = Opcode(0x4c);
/// The next two bytes sets the number of bytes to push onto the stack
pub const OP_PUSHDATA2: Opcode = Opcode(0x4d);
/// The next four bytes sets the number of bytes to push onto the stack
pub const OP_PUSHDATA4: Opcode = Opcode(0x4e);
/// Pushes -1 onto the stack
pub const OP_1NEGATE: Opcode = Opcode(0x4f);
/// Pushes 1 onto the stack
pub const OP_1: Opcode = Opcode(0x51);
/// Pushes 16 onto the stack
pub const OP_16: Opcode = Opcode(0x60);
/// Marks the output as unspendable.
pub const OP_RETURN: Opcode = Opcode(0x6a);
/// Duplicates the top stack item.
pub const OP_DUP: Opcode = Opcode(0x76);
/// Pushes 1 if the inputs are exactly equal, 0 otherwise.
pub const OP_EQUAL: Opcode = Opcode(0x87);
/// Same as OP_EQUAL, but runs OP_VERIFY afterward.
pub const OP_EQUALVERIFY: Opcode = Opcode(0x88);
/// The input is hashed twice: first with SHA-256 and then with RIPEMD-160.
pub const OP_HASH160: Opcode = Opcode(0xa9);
/// Checks a signature against a public key.
pub const OP_CHECKSIG: Opcode = Opcode(0xac);
/// Checks m-of-n signatures against public keys.
pub const OP_CHECKMULTISIG: Opcode = Opcode(0xae);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_ints() {
        assert_eq!(OP_1.small_int(), Some(1));
        assert_eq!(OP_16.small_int(), Some(16));
        assert_eq!(OP_0.small_int(), None);
        assert_eq!(Opcode::from_small_int(0), Some(OP_0));
        assert_eq!(Opcode::from_small_int(5), Some(Opcode::from(0x55)));
        assert_eq!(Opcode::from_small_int(17), None);
    }

    #[test]
    fn debug_names() {
        assert_eq!(format!("{:?}", OP_CHECKSIG), "OP_CHECKSIG");
        assert_eq!(format!("{:?}", Opcode::from(0x52)), "OP_2");
        assert_eq!(format!("{:?}", Opcode::from(0x14)), "OP_PUSHBYTES_20");
    }
}
