use crate::bitcoin::script::opcodes::{self, Opcode};
use crate::bitcoin::Script;

/// ScriptBuilder can be used to build [Script]s.
///
/// Pushes are always encoded minimally: small integers use the `OP_n` opcodes and data uses the
/// shortest push opcode that can hold it.
#[derive(Default, Clone, Debug)]
pub struct ScriptBuilder {
    raw: Vec<u8>,
}

impl ScriptBuilder {
    /// Create a new Scriptbuilder for constructing a [Script].
    pub fn new() -> ScriptBuilder {
        Self { raw: Vec::new() }
    }

    /// Build the script.
    pub fn build(&self) -> Script {
        Script::from(self.raw.clone())
    }

    /// Add an opcode to the script.
    pub fn push_opcode(&mut self, op: Opcode) -> &mut ScriptBuilder {
        self.raw.push(op.to_u8());
        self
    }

    /// Add a number to the script.
    ///
    /// -1 and 0 to 16 use the dedicated opcodes, anything else is pushed as a script number.
    pub fn push_int(&mut self, n: i64) -> &mut ScriptBuilder {
        if n == -1 {
            return self.push_opcode(opcodes::OP_1NEGATE);
        }
        if (0..=16).contains(&n) {
            if let Some(op) = Opcode::from_small_int(n as u8) {
                return self.push_opcode(op);
            }
        }
        let encoded = scriptnum_encode(n);
        self.push_slice(&encoded)
    }

    /// Add a data push to the script.
    pub fn push_slice(&mut self, data: &[u8]) -> &mut ScriptBuilder {
        let len = data.len();
        if len < opcodes::OP_PUSHDATA1.to_u8() as usize {
            self.raw.push(len as u8);
        } else if len <= 0xff {
            self.raw.push(opcodes::OP_PUSHDATA1.to_u8());
            self.raw.push(len as u8);
        } else if len <= 0xffff {
            self.raw.push(opcodes::OP_PUSHDATA2.to_u8());
            self.raw.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.raw.push(opcodes::OP_PUSHDATA4.to_u8());
            self.raw.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.raw.extend_from_slice(data);
        self
    }
}

// Little-endian magnitude with the sign in the top bit of the last byte.
fn scriptnum_encode(n: i64) -> Vec<u8> {
    let mut result = Vec::new();
    if n == 0 {
        return result;
    }
    let negative = n < 0;
    let mut abs = n.unsigned_abs();
    while abs > 0 {
        result.push((abs & 0xff) as u8);
        abs >>= 8;
    }
    if let Some(last) = result.last_mut() {
        if *last & 0x80 != 0 {
            result.push(if negative { 0x80 } else { 0x00 });
        } else if negative {
            *last |= 0x80;
        }
    }
    result
}
