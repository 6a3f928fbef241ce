//! Depth-stencil state aggregate.

/// Comparison used by depth and stencil tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    /// Always pass.
    Always,
    /// Never pass.
    Never,
    /// Pass if less than.
    Less,
    /// Pass if less than or equal.
    LessEqual,
    /// Pass if equal.
    Equal,
    /// Pass if greater than or equal.
    GreaterEqual,
    /// Pass if greater than.
    Greater,
    /// Pass if not equal.
    NotEqual,
}

/// Operation applied to the stencil buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilOperation {
    /// Keep the current value.
    Keep,
    /// Set to zero.
    Zero,
    /// Replace with the reference value.
    Replace,
    /// Increment, wrapping.
    Increment,
    /// Decrement, wrapping.
    Decrement,
    /// Increment, clamping at the maximum.
    IncrementSaturation,
    /// Decrement, clamping at zero.
    DecrementSaturation,
    /// Bitwise invert.
    Invert,
}

/// Depth and stencil test configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthStencilState {
    pub depth_buffer_enable: bool,
    pub depth_buffer_write_enable: bool,
    pub depth_buffer_function: CompareFunction,
    pub stencil_enable: bool,
    pub stencil_function: CompareFunction,
    pub stencil_pass: StencilOperation,
    pub stencil_fail: StencilOperation,
    pub stencil_depth_buffer_fail: StencilOperation,
    pub two_sided_stencil_mode: bool,
    pub counter_clockwise_stencil_function: CompareFunction,
    pub counter_clockwise_stencil_pass: StencilOperation,
    pub counter_clockwise_stencil_fail: StencilOperation,
    pub counter_clockwise_stencil_depth_buffer_fail: StencilOperation,
    pub stencil_mask: i32,
    pub stencil_write_mask: i32,
    pub reference_stencil: i32,
}

impl DepthStencilState {
    /// Depth test and depth writes enabled.
    pub fn depth_default() -> Self {
        Self::default()
    }

    /// Depth test enabled, depth writes disabled.
    pub fn depth_read() -> Self {
        Self {
            depth_buffer_write_enable: false,
            ..Self::default()
        }
    }

    /// No depth test, no depth writes.
    pub fn none() -> Self {
        Self {
            depth_buffer_enable: false,
            depth_buffer_write_enable: false,
            ..Self::default()
        }
    }
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_buffer_enable: true,
            depth_buffer_write_enable: true,
            depth_buffer_function: CompareFunction::LessEqual,
            stencil_enable: false,
            stencil_function: CompareFunction::Always,
            stencil_pass: StencilOperation::Keep,
            stencil_fail: StencilOperation::Keep,
            stencil_depth_buffer_fail: StencilOperation::Keep,
            two_sided_stencil_mode: false,
            counter_clockwise_stencil_function: CompareFunction::Always,
            counter_clockwise_stencil_pass: StencilOperation::Keep,
            counter_clockwise_stencil_fail: StencilOperation::Keep,
            counter_clockwise_stencil_depth_buffer_fail: StencilOperation::Keep,
            stencil_mask: i32::MAX,
            stencil_write_mask: i32::MAX,
            reference_stencil: 0,
        }
    }
}
