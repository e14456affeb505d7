//! Register trace files
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! w <register>[@chips] <value>   register write; register is a name or a hex byte offset
//! tex <offset> <value>           texture memory write (dword offset)
//! lfb <offset> <value> [mask]    linear frame buffer write (dword offset)
//! vblank [count]                 vertical retrace
//! flush                          drain the register FIFO
//! ```
//!
//! Values are hex with a `0x` prefix, decimal, or a float with an `f` suffix (written as its
//! IEEE bits).

use anyhow::{anyhow, bail, Context};
use regex::Regex;
use std::sync::LazyLock;
use voodoo_core::{Voodoo, NUM_REGISTERS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceCommand {
    WriteRegister { offset: u32, data: u32 },
    WriteTexture { offset: u32, data: u32 },
    WriteLfb { offset: u32, data: u32, mem_mask: u32 },
    Vblank { count: u32 },
    Flush,
}

static REGISTER_WRITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^w\s+([A-Za-z0-9_.]+)(?:@([0-9a-fA-F]))?\s+(\S+)$").unwrap()
});
static MEMORY_WRITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(tex|lfb)\s+(\S+)\s+(\S+)(?:\s+(\S+))?$").unwrap()
});
static VBLANK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^vblank(?:\s+(\S+))?$").unwrap());

fn parse_u32(s: &str) -> anyhow::Result<u32> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u32::from_str_radix(&hex.replace('_', ""), 16)
            .with_context(|| format!("Invalid hex value '{s}'"));
    }

    if let Some(float) = s.strip_suffix('f') {
        let value: f32 = float.parse().with_context(|| format!("Invalid float value '{s}'"))?;
        return Ok(value.to_bits());
    }

    if let Some(negative) = s.strip_prefix('-') {
        let value: i32 = negative.parse().with_context(|| format!("Invalid value '{s}'"))?;
        return Ok(value.wrapping_neg() as u32);
    }

    s.parse().with_context(|| format!("Invalid value '{s}'"))
}

// Register names resolve through the chip's name table; hex offsets are byte offsets
fn parse_register(s: &str, find_register: &impl Fn(&str) -> Option<usize>) -> anyhow::Result<u32> {
    if s.starts_with("0x") || s.starts_with("0X") {
        let offset = parse_u32(s)?;
        if offset % 4 != 0 || offset >= 4 * NUM_REGISTERS as u32 {
            bail!("Register offset {offset:#X} is not an aligned register address");
        }
        return Ok(offset / 4);
    }

    find_register(s).map(|index| index as u32).ok_or_else(|| anyhow!("Unknown register '{s}'"))
}

fn parse_line(
    line: &str,
    find_register: &impl Fn(&str) -> Option<usize>,
) -> anyhow::Result<Option<TraceCommand>> {
    let line = line.split('#').next().unwrap_or_default().trim();
    if line.is_empty() {
        return Ok(None);
    }

    if line == "flush" {
        return Ok(Some(TraceCommand::Flush));
    }

    if let Some(captures) = REGISTER_WRITE.captures(line) {
        let register = parse_register(&captures[1], find_register)?;
        let chips = match captures.get(2) {
            Some(chips) => u32::from_str_radix(chips.as_str(), 16)?,
            None => 0,
        };
        let data = parse_u32(&captures[3])?;
        return Ok(Some(TraceCommand::WriteRegister { offset: register | (chips << 8), data }));
    }

    if let Some(captures) = MEMORY_WRITE.captures(line) {
        let offset = parse_u32(&captures[2])?;
        let data = parse_u32(&captures[3])?;
        let command = match &captures[1] {
            "tex" => {
                if captures.get(4).is_some() {
                    bail!("Texture writes take no byte mask");
                }
                TraceCommand::WriteTexture { offset, data }
            }
            _ => {
                let mem_mask = captures.get(4).map_or(Ok(0xFFFF_FFFF), |m| parse_u32(m.as_str()))?;
                TraceCommand::WriteLfb { offset, data, mem_mask }
            }
        };
        return Ok(Some(command));
    }

    if let Some(captures) = VBLANK.captures(line) {
        let count = captures.get(1).map_or(Ok(1), |m| parse_u32(m.as_str()))?;
        return Ok(Some(TraceCommand::Vblank { count }));
    }

    bail!("Unrecognized command '{line}'")
}

/// Parse a whole trace. `find_register` resolves register names, normally
/// [`Voodoo::find_register`] of the chip the trace is replayed on.
///
/// # Errors
///
/// Returns the first malformed line, with its 1-based line number.
pub fn parse_trace(
    text: &str,
    find_register: impl Fn(&str) -> Option<usize>,
) -> anyhow::Result<Vec<TraceCommand>> {
    let mut commands = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let command =
            parse_line(line, &find_register).with_context(|| format!("Trace line {}", i + 1))?;
        commands.extend(command);
    }

    Ok(commands)
}

pub fn replay(voodoo: &mut Voodoo, commands: &[TraceCommand]) {
    for &command in commands {
        match command {
            TraceCommand::WriteRegister { offset, data } => voodoo.write_register(offset, data),
            TraceCommand::WriteTexture { offset, data } => voodoo.write_texture(offset, data),
            TraceCommand::WriteLfb { offset, data, mem_mask } => {
                voodoo.write_lfb(offset, data, mem_mask);
            }
            TraceCommand::Vblank { count } => {
                for _ in 0..count {
                    voodoo.vblank();
                    voodoo.end_vblank();
                }
            }
            TraceCommand::Flush => voodoo.flush(),
        }
    }

    voodoo.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use voodoo_core::{Register, VoodooConfig};

    fn parse(text: &str) -> anyhow::Result<Vec<TraceCommand>> {
        let voodoo = Voodoo::new(VoodooConfig::default()).unwrap();
        parse_trace(text, |name| voodoo.find_register(name))
    }

    #[test]
    fn register_writes() {
        let commands = parse(
            "# setup\n\
             w fbzMode 0x0000_0610\n\
             w 0x110@2 1552   # trailing comment\n\
             \n\
             w fstartR 255.0f\n\
             w startZ -4096\n",
        )
        .unwrap();

        let fbz_mode = Register::FBZ_MODE as u32;
        assert_eq!(commands, vec![
            TraceCommand::WriteRegister { offset: fbz_mode, data: 0x610 },
            TraceCommand::WriteRegister { offset: fbz_mode | (2 << 8), data: 0x610 },
            TraceCommand::WriteRegister {
                offset: Register::FSTART_R as u32,
                data: 255.0_f32.to_bits()
            },
            TraceCommand::WriteRegister { offset: Register::START_Z as u32, data: 0xFFFF_F000 },
        ]);
    }

    #[test]
    fn memory_and_control_commands() {
        let commands = parse("tex 0x80000 0x11223344\nlfb 0x200 0xFFFF\nlfb 0 1 0xFFFF\nvblank\nvblank 3\nflush").unwrap();

        assert_eq!(commands, vec![
            TraceCommand::WriteTexture { offset: 0x80000, data: 0x1122_3344 },
            TraceCommand::WriteLfb { offset: 0x200, data: 0xFFFF, mem_mask: 0xFFFF_FFFF },
            TraceCommand::WriteLfb { offset: 0, data: 1, mem_mask: 0xFFFF },
            TraceCommand::Vblank { count: 1 },
            TraceCommand::Vblank { count: 3 },
            TraceCommand::Flush,
        ]);
    }

    #[test]
    fn errors_carry_line_numbers() {
        for (text, line) in [
            ("flush\nw notARegister 1", 2),
            ("w 0x111 1", 1),
            ("\n\nw fbzMode 0xZZ", 3),
            ("draw", 1),
            ("tex 0 0 0", 1),
        ] {
            let err = parse(text).unwrap_err();
            assert_eq!(err.to_string(), format!("Trace line {line}"), "{text:?}");
        }
    }

    #[test]
    fn replay_draws_and_swaps() {
        let commands = parse(
            "w fbiInit1 0x10\n\
             w fbiInit2 0x2000\n\
             w fbzMode 0x4200\n\
             w color1 0x00FFFFFF\n\
             w clipLeftRight 0x00000004\n\
             w clipLowYHighY 0x00000002\n\
             w fastfillCMD 0\n\
             w swapbufferCMD 1\n\
             vblank",
        )
        .unwrap();

        let mut voodoo = Voodoo::new(VoodooConfig::default()).unwrap();
        replay(&mut voodoo, &commands);

        // Filled the back buffer, then the synced swap brought it to the front
        assert_eq!(voodoo.statistics().pixels_out, 8);
        assert_eq!(voodoo.read_pixel(voodoo_core::BufferSelect::Front, 3, 1), Some(0xFFFF));
        assert_eq!(voodoo.read_pixel(voodoo_core::BufferSelect::Front, 4, 1), Some(0));
    }
}
