//! Frame Constant Layouts
//!
//! Fixed-layout structs uploaded to the GPU once per frame. Each struct is
//! declared once through [`define_uniform_struct!`], which generates:
//! - the `#[repr(C)]` Pod struct
//! - a `Default` impl honoring `= value` field defaults
//! - the matching WGSL struct declaration
//!
//! Every struct is a multiple of 16 bytes with no implicit padding.
//! Camera matrices are stored transposed (row-vector shader convention).

use std::borrow::Cow;
use std::collections::HashSet;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

// ============================================================================
// 1. Rust Type -> WGSL Type
// ============================================================================
pub trait WgslType {
    fn wgsl_type_name() -> Cow<'static, str>;

    /// Appends the declarations this type depends on, each at most once.
    fn collect_wgsl_defs(_defs: &mut Vec<String>, _inserted: &mut HashSet<String>) {}
}

impl WgslType for f32 { fn wgsl_type_name() -> Cow<'static, str> { "f32".into() } }
impl WgslType for i32 { fn wgsl_type_name() -> Cow<'static, str> { "i32".into() } }
impl WgslType for Vec3 { fn wgsl_type_name() -> Cow<'static, str> { "vec3<f32>".into() } }
impl WgslType for Vec4 { fn wgsl_type_name() -> Cow<'static, str> { "vec4<f32>".into() } }
impl WgslType for Mat4 { fn wgsl_type_name() -> Cow<'static, str> { "mat4x4<f32>".into() } }

pub trait WgslStruct: Pod + Zeroable {
    /// Declaration of `struct_name` preceded by every nested struct it uses.
    fn wgsl_struct_def(struct_name: &str) -> String;
}

// ============================================================================
// 2. Struct Generator
// ============================================================================

// Fields prefixed with `__` are padding; the prefix is stripped in WGSL.
macro_rules! define_uniform_struct {
    (
        $(#[$meta:meta])* struct $name:ident {
            $( $vis:vis $field:ident : $ty:ty $(= $default:expr)? ),* $(,)?
        }
    ) => {
        #[repr(C)]
        #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
        $(#[$meta])*
        pub struct $name {
            $( $vis $field: $ty, )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $( $field: define_uniform_struct!(@default $ty $(, $default)?), )*
                }
            }
        }

        impl $name {
            fn wgsl_body(struct_name: &str) -> String {
                let mut code = format!("struct {struct_name} {{\n");
                $(
                    code.push_str(&format!(
                        "    {}: {},\n",
                        stringify!($field).trim_start_matches('_'),
                        <$ty as WgslType>::wgsl_type_name()
                    ));
                )*
                code.push_str("};\n");
                code
            }

            fn collect_field_defs(defs: &mut Vec<String>, inserted: &mut HashSet<String>) {
                $( <$ty as WgslType>::collect_wgsl_defs(defs, inserted); )*
            }
        }

        impl WgslType for $name {
            fn wgsl_type_name() -> Cow<'static, str> {
                stringify!($name).into()
            }

            fn collect_wgsl_defs(defs: &mut Vec<String>, inserted: &mut HashSet<String>) {
                Self::collect_field_defs(defs, inserted);
                if inserted.insert(stringify!($name).to_string()) {
                    defs.push(Self::wgsl_body(stringify!($name)));
                }
            }
        }

        impl WgslStruct for $name {
            fn wgsl_struct_def(struct_name: &str) -> String {
                let mut defs = Vec::new();
                let mut inserted = HashSet::new();
                Self::collect_field_defs(&mut defs, &mut inserted);
                defs.push(Self::wgsl_body(struct_name));
                defs.join("\n")
            }
        }
    };

    (@default $ty:ty, $val:expr) => { $val };
    (@default $ty:ty) => { <$ty as Default>::default() };
}

// ============================================================================
// 3. Frame Constants
// ============================================================================

define_uniform_struct!(
    /// Camera block. All matrices are transposed.
    struct CameraAttribs {
        pub position: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0),
        // (width, height, 1/width, 1/height); zero until the first camera update
        pub viewport_size: Vec4,

        pub view_t: Mat4 = Mat4::IDENTITY,
        pub proj_t: Mat4 = Mat4::IDENTITY,
        pub view_proj_t: Mat4 = Mat4::IDENTITY,
        pub view_inv_t: Mat4 = Mat4::IDENTITY,
        pub proj_inv_t: Mat4 = Mat4::IDENTITY,
        pub view_proj_inv_t: Mat4 = Mat4::IDENTITY,
    }
);

define_uniform_struct!(
    struct PbrLightAttribs {
        pub direction: Vec3,
        pub intensity: f32,
    }
);

define_uniform_struct!(
    /// Renderer tuning block.
    struct PbrRendererShaderParameters {
        pub average_log_lum: f32 = 0.3,
        pub middle_gray: f32 = 0.18,
        pub white_point: f32 = 3.0,
        pub prefiltered_cube_mip_levels: f32,

        pub ibl_scale: f32 = 1.0,
        pub debug_view_type: i32,
        pub occlusion_strength: f32 = 1.0,
        pub emission_scale: f32 = 1.0,

        pub unshaded_color: Vec4 = Vec4::ONE,
        pub highlight_color: Vec4,
        pub custom_data: Vec4,

        pub point_size: f32 = 1.0,
        pub(crate) __padding0: f32,
        pub(crate) __padding1: f32,
        pub(crate) __padding2: f32,
    }
);

define_uniform_struct!(
    /// Per-frame constant buffer payload.
    struct PbrFrameAttribs {
        pub camera: CameraAttribs,
        pub prev_camera: CameraAttribs,
        pub light: PbrLightAttribs,
        pub renderer: PbrRendererShaderParameters,
    }
);

impl PbrFrameAttribs {
    /// Size of the payload in bytes.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
