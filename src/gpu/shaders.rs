//! WGSL sources for the particle pass and the bloom chain.

/// Instanced, lit particle boxes rendered into the HDR target.
///
/// Vertex inputs: slot 0 is the unit cube (position, normal), slot 1 the
/// per-instance model matrix columns and colour.
pub const SCENE_SHADER: &str = r#"
struct Scene {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    // xyz: direction toward the light, w: intensity
    light: vec4<f32>,
    // x: ambient term
    ambient: vec4<f32>,
};

@group(0) @binding(0) var<uniform> scene: Scene;

struct VertexIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceIn {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(2) world_position: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexIn, instance: InstanceIn) -> VertexOut {
    let model = mat4x4<f32>(instance.model_0, instance.model_1, instance.model_2, instance.model_3);
    let world = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOut;
    out.clip_position = scene.view_proj * world;
    // Face normals are axis aligned, so scaling them keeps their direction.
    out.normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.color = instance.color.rgb;
    out.world_position = world.xyz;
    return out;
}

@fragment
fn fs_main(in: VertexOut) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let l = normalize(scene.light.xyz);
    let v = normalize(scene.camera_position.xyz - in.world_position);
    let h = normalize(l + v);

    let diffuse = max(dot(n, l), 0.0) * scene.light.w;
    let specular = pow(max(dot(n, h), 0.0), 32.0) * 0.25 * scene.light.w;

    let color = in.color * (scene.ambient.x + diffuse) + vec3<f32>(specular);
    return vec4<f32>(color, 1.0);
}
"#;

/// Fullscreen passes: bright filter, separable blur and final composite.
///
/// All three share one bind group layout. `scene_texture` is only read by
/// the composite.
pub const BLOOM_SHADER: &str = r#"
struct Bloom {
    // Texel step of the blur, zero for the other passes
    direction: vec2<f32>,
    strength: f32,
    radius: f32,
    threshold: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0) var source: texture_2d<f32>;
@group(0) @binding(1) var linear_sampler: sampler;
@group(0) @binding(2) var<uniform> bloom: Bloom;
@group(0) @binding(3) var scene_texture: texture_2d<f32>;

struct FullscreenOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

// One oversized triangle covering the screen.
@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> FullscreenOut {
    let x = f32((index << 1u) & 2u);
    let y = f32(index & 2u);

    var out: FullscreenOut;
    out.clip_position = vec4<f32>(x * 2.0 - 1.0, 1.0 - y * 2.0, 0.0, 1.0);
    out.uv = vec2<f32>(x, y);
    return out;
}

@fragment
fn fs_bright(in: FullscreenOut) -> @location(0) vec4<f32> {
    let color = textureSample(source, linear_sampler, in.uv).rgb;
    let luma = dot(color, vec3<f32>(0.2126, 0.7152, 0.0722));
    let weight = smoothstep(bloom.threshold, bloom.threshold + 0.01, luma);
    return vec4<f32>(color * weight, 1.0);
}

@fragment
fn fs_blur(in: FullscreenOut) -> @location(0) vec4<f32> {
    let step = bloom.direction * (1.0 + bloom.radius * 3.0);

    var sum = textureSample(source, linear_sampler, in.uv).rgb * 0.227027;
    sum += textureSample(source, linear_sampler, in.uv + step * 1.0).rgb * 0.1945946;
    sum += textureSample(source, linear_sampler, in.uv - step * 1.0).rgb * 0.1945946;
    sum += textureSample(source, linear_sampler, in.uv + step * 2.0).rgb * 0.1216216;
    sum += textureSample(source, linear_sampler, in.uv - step * 2.0).rgb * 0.1216216;
    sum += textureSample(source, linear_sampler, in.uv + step * 3.0).rgb * 0.054054;
    sum += textureSample(source, linear_sampler, in.uv - step * 3.0).rgb * 0.054054;
    sum += textureSample(source, linear_sampler, in.uv + step * 4.0).rgb * 0.016216;
    sum += textureSample(source, linear_sampler, in.uv - step * 4.0).rgb * 0.016216;
    return vec4<f32>(sum, 1.0);
}

@fragment
fn fs_composite(in: FullscreenOut) -> @location(0) vec4<f32> {
    let base = textureSample(scene_texture, linear_sampler, in.uv).rgb;
    let glow = textureSample(source, linear_sampler, in.uv).rgb;
    let hdr = base + glow * bloom.strength;
    // Reinhard
    let mapped = hdr / (hdr + vec3<f32>(1.0));
    return vec4<f32>(mapped, 1.0);
}
"#;
