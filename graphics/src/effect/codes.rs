//! Raw enumeration codes emitted by the effect compiler.
//!
//! Descriptor trees and reported state changes carry these as plain `u32`
//! values. They are mapped to device-level enums by [`super::tables`].

/// Symbol classes (`value_class`).
pub mod symbol_class {
    pub const SCALAR: u32 = 0;
    pub const VECTOR: u32 = 1;
    pub const MATRIX_ROWS: u32 = 2;
    pub const MATRIX_COLUMNS: u32 = 3;
    pub const OBJECT: u32 = 4;
    pub const STRUCT: u32 = 5;
}

/// Symbol types (`value_type`).
pub mod symbol_type {
    pub const VOID: u32 = 0;
    pub const BOOL: u32 = 1;
    pub const INT: u32 = 2;
    pub const FLOAT: u32 = 3;
    pub const STRING: u32 = 4;
    pub const TEXTURE: u32 = 5;
    pub const TEXTURE1D: u32 = 6;
    pub const TEXTURE2D: u32 = 7;
    pub const TEXTURE3D: u32 = 8;
    pub const TEXTURECUBE: u32 = 9;
    pub const SAMPLER: u32 = 10;
    pub const SAMPLER1D: u32 = 11;
    pub const SAMPLER2D: u32 = 12;
    pub const SAMPLER3D: u32 = 13;
    pub const SAMPLERCUBE: u32 = 14;
    pub const PIXELSHADER: u32 = 15;
    pub const VERTEXSHADER: u32 = 16;
    pub const PIXELFRAGMENT: u32 = 17;
    pub const VERTEXFRAGMENT: u32 = 18;
    pub const UNSUPPORTED: u32 = 19;

    /// Returns true for any texture object type.
    pub fn is_texture(value_type: u32) -> bool {
        (TEXTURE..=TEXTURECUBE).contains(&value_type)
    }

    /// Returns true for any sampler object type.
    pub fn is_sampler(value_type: u32) -> bool {
        (SAMPLER..=SAMPLERCUBE).contains(&value_type)
    }

    /// Returns true for shader objects.
    pub fn is_shader(value_type: u32) -> bool {
        value_type == PIXELSHADER || value_type == VERTEXSHADER
    }
}

/// Render state types reported by an applied pass.
pub mod render_state {
    pub const ZENABLE: u32 = 0;
    pub const FILLMODE: u32 = 1;
    pub const SHADEMODE: u32 = 2;
    pub const ZWRITEENABLE: u32 = 3;
    pub const ALPHATESTENABLE: u32 = 4;
    pub const LASTPIXEL: u32 = 5;
    pub const SRCBLEND: u32 = 6;
    pub const DESTBLEND: u32 = 7;
    pub const CULLMODE: u32 = 8;
    pub const ZFUNC: u32 = 9;
    pub const ALPHAREF: u32 = 10;
    pub const ALPHAFUNC: u32 = 11;
    pub const DITHERENABLE: u32 = 12;
    pub const ALPHABLENDENABLE: u32 = 13;
    pub const FOGENABLE: u32 = 14;
    pub const STENCILENABLE: u32 = 22;
    pub const STENCILFAIL: u32 = 23;
    pub const STENCILZFAIL: u32 = 24;
    pub const STENCILPASS: u32 = 25;
    pub const STENCILFUNC: u32 = 26;
    pub const STENCILREF: u32 = 27;
    pub const STENCILMASK: u32 = 28;
    pub const STENCILWRITEMASK: u32 = 29;
    pub const TEXTUREFACTOR: u32 = 30;
    pub const WRAP0: u32 = 31;
    pub const CLIPPING: u32 = 47;
    pub const LIGHTING: u32 = 48;
    pub const MULTISAMPLEANTIALIAS: u32 = 67;
    pub const MULTISAMPLEMASK: u32 = 68;
    pub const COLORWRITEENABLE: u32 = 73;
    pub const BLENDOP: u32 = 75;
    pub const SCISSORTESTENABLE: u32 = 78;
    pub const SLOPESCALEDEPTHBIAS: u32 = 79;
    pub const TWOSIDEDSTENCILMODE: u32 = 88;
    pub const CCW_STENCILFAIL: u32 = 89;
    pub const CCW_STENCILZFAIL: u32 = 90;
    pub const CCW_STENCILPASS: u32 = 91;
    pub const CCW_STENCILFUNC: u32 = 92;
    pub const COLORWRITEENABLE1: u32 = 93;
    pub const COLORWRITEENABLE2: u32 = 94;
    pub const COLORWRITEENABLE3: u32 = 95;
    pub const BLENDFACTOR: u32 = 96;
    pub const SRGBWRITEENABLE: u32 = 97;
    pub const DEPTHBIAS: u32 = 98;
    pub const SEPARATEALPHABLENDENABLE: u32 = 99;
    pub const SRCBLENDALPHA: u32 = 100;
    pub const DESTBLENDALPHA: u32 = 101;
    pub const BLENDOPALPHA: u32 = 102;
    pub const VERTEXSHADER: u32 = 146;
    pub const PIXELSHADER: u32 = 147;
}

/// Sampler state types reported per sampler register.
pub mod sampler_state {
    pub const UNKNOWN0: u32 = 0;
    pub const TEXTURE: u32 = 4;
    pub const ADDRESSU: u32 = 5;
    pub const ADDRESSV: u32 = 6;
    pub const ADDRESSW: u32 = 7;
    pub const BORDERCOLOR: u32 = 8;
    pub const MAGFILTER: u32 = 9;
    pub const MINFILTER: u32 = 10;
    pub const MIPFILTER: u32 = 11;
    pub const MIPMAPLODBIAS: u32 = 12;
    pub const MAXMIPLEVEL: u32 = 13;
    pub const MAXANISOTROPY: u32 = 14;
    pub const SRGBTEXTURE: u32 = 15;
    pub const ELEMENTINDEX: u32 = 16;
    pub const DMAPOFFSET: u32 = 17;
}

/// Depth buffer modes reported for the z-enable render state.
pub mod z_buffer_type {
    pub const FALSE: u32 = 0;
    pub const TRUE: u32 = 1;
    pub const WHR: u32 = 2;
}
