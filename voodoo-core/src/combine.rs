//! The select/subtract/blend/add/clamp/invert equation shared by the texture combine stage and
//! the color combine (colorpath) stage


use crate::color::Argb;
use crate::registers::{FbzColorPath, TextureMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendFactor {
    #[default]
    Zero,
    // c_local for RGB, a_local for alpha
    Local,
    OtherAlpha,
    LocalAlpha,
    TextureAlpha,
    TextureColor,
    Detail,
    LodFraction,
}

impl BlendFactor {
    fn from_color_path_rgb(bits: u8) -> Self {
        match bits {
            1 => Self::Local,
            2 => Self::OtherAlpha,
            3 => Self::LocalAlpha,
            4 => Self::TextureAlpha,
            5 => Self::TextureColor,
            _ => Self::Zero,
        }
    }

    fn from_color_path_alpha(bits: u8) -> Self {
        match bits {
            1 | 3 => Self::LocalAlpha,
            2 => Self::OtherAlpha,
            4 => Self::TextureAlpha,
            _ => Self::Zero,
        }
    }

    fn from_texture_mode(bits: u8) -> Self {
        match bits {
            1 => Self::Local,
            2 => Self::OtherAlpha,
            3 => Self::LocalAlpha,
            4 => Self::Detail,
            5 => Self::LodFraction,
            _ => Self::Zero,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddSelect {
    #[default]
    None,
    Local,
    LocalAlpha,
}

impl AddSelect {
    fn from_rgb_bits(bits: u8) -> Self {
        match bits {
            1 => Self::Local,
            2 => Self::LocalAlpha,
            _ => Self::None,
        }
    }

    // Any nonzero alpha add code adds a_local
    fn from_alpha_bits(bits: u8) -> Self {
        if bits != 0 { Self::LocalAlpha } else { Self::None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelCombine {
    pub zero_other: bool,
    pub sub_local: bool,
    pub factor: BlendFactor,
    pub reverse_blend: bool,
    pub add: AddSelect,
    pub invert: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CombineUnit {
    pub rgb: ChannelCombine,
    pub alpha: ChannelCombine,
}

// Blend factor sources that come from outside the (other, local) pair
#[derive(Debug, Clone, Copy, Default)]
pub struct FactorInputs {
    pub texel: Argb,
    pub detail: i32,
    pub lod: i32,
}

impl CombineUnit {
    pub fn from_color_path(color_path: FbzColorPath) -> Self {
        Self {
            rgb: ChannelCombine {
                zero_other: color_path.cc_zero_other(),
                sub_local: color_path.cc_sub_clocal(),
                factor: BlendFactor::from_color_path_rgb(color_path.cc_mselect()),
                reverse_blend: color_path.cc_reverse_blend(),
                add: AddSelect::from_rgb_bits(color_path.cc_add_aclocal()),
                invert: color_path.cc_invert_output(),
            },
            alpha: ChannelCombine {
                zero_other: color_path.cca_zero_other(),
                sub_local: color_path.cca_sub_clocal(),
                factor: BlendFactor::from_color_path_alpha(color_path.cca_mselect()),
                reverse_blend: color_path.cca_reverse_blend(),
                add: AddSelect::from_alpha_bits(color_path.cca_add_aclocal()),
                invert: color_path.cca_invert_output(),
            },
        }
    }

    pub fn from_texture_mode(texture_mode: TextureMode) -> Self {
        Self {
            rgb: ChannelCombine {
                zero_other: texture_mode.tc_zero_other(),
                sub_local: texture_mode.tc_sub_clocal(),
                factor: BlendFactor::from_texture_mode(texture_mode.tc_mselect()),
                reverse_blend: texture_mode.tc_reverse_blend(),
                add: AddSelect::from_rgb_bits(texture_mode.tc_add_aclocal()),
                invert: texture_mode.tc_invert_output(),
            },
            alpha: ChannelCombine {
                zero_other: texture_mode.tca_zero_other(),
                sub_local: texture_mode.tca_sub_clocal(),
                factor: BlendFactor::from_texture_mode(texture_mode.tca_mselect()),
                reverse_blend: texture_mode.tca_reverse_blend(),
                add: AddSelect::from_alpha_bits(texture_mode.tca_add_aclocal()),
                invert: texture_mode.tca_invert_output(),
            },
        }
    }

    // `local.a` carries a_local
    pub fn combine(&self, other: Argb, local: Argb, inputs: &FactorInputs) -> Argb {
        let channel = |unit: &ChannelCombine, other_c: u8, local_c: u8, texel_c: u8| {
            let mut value = if unit.zero_other { 0 } else { i32::from(other_c) };
            if unit.sub_local {
                value -= i32::from(local_c);
            }

            let mut factor = match unit.factor {
                BlendFactor::Zero => 0,
                BlendFactor::Local => i32::from(local_c),
                BlendFactor::OtherAlpha => i32::from(other.a),
                BlendFactor::LocalAlpha => i32::from(local.a),
                BlendFactor::TextureAlpha => i32::from(inputs.texel.a),
                BlendFactor::TextureColor => i32::from(texel_c),
                BlendFactor::Detail => inputs.detail,
                BlendFactor::LodFraction => inputs.lod & 0xFF,
            };
            if !unit.reverse_blend {
                factor ^= 0xFF;
            }
            value = (value * (factor + 1)) >> 8;

            value += match unit.add {
                AddSelect::None => 0,
                AddSelect::Local => i32::from(local_c),
                AddSelect::LocalAlpha => i32::from(local.a),
            };

            let value = value.clamp(0, 0xFF) as u8;
            if unit.invert { value ^ 0xFF } else { value }
        };

        Argb::new(
            channel(&self.alpha, other.a, local.a, inputs.texel.a),
            channel(&self.rgb, other.r, local.r, inputs.texel.r),
            channel(&self.rgb, other.g, local.g, inputs.texel.g),
            channel(&self.rgb, other.b, local.b, inputs.texel.b),
        )
    }
}
