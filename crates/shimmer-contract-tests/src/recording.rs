//! A `GlApi` that records every call and models just enough GL state to be checked.
//!
//! Shader objects "compile" unless their source contains `COMPILE_ERROR_MARKER`. A program
//! links when exactly one compiled vertex and one compiled fragment shader are attached and
//! neither source contains `LINK_ERROR_MARKER`.
//! Active attributes and uniforms are read from `attribute`/`uniform` declarations, and every
//! successful link moves their locations so stale lookups are detectable.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use shimmer_runtime_glow::{Clock, DrawSurface, GlApi, Notifier, ShaderStage};

pub const INVALID_OPERATION: u32 = 0x0502;
pub const COMPILE_ERROR_MARKER: &str = "#error";
pub const STUB_COMPILE_LOG: &str = "ERROR: 0:1: '#error' : stub compile failure";
/// Compiles fine but makes any program it is linked into fail.
pub const LINK_ERROR_MARKER: &str = "//link_error";
pub const STUB_LINK_LOG: &str = "error: varying v_texcoord does not match between stages";

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateShader { stage: ShaderStage, id: u32 },
    ShaderSource { shader: u32 },
    CompileShader { shader: u32 },
    DeleteShader { shader: u32 },
    CreateProgram { id: u32 },
    AttachShader { program: u32, shader: u32 },
    DetachShader { program: u32, shader: u32 },
    LinkProgram { program: u32 },
    UseProgram(Option<u32>),
    AttribLocation { name: String },
    UniformLocation { name: String },
    CreateBuffer { id: u32 },
    BindArrayBuffer(Option<u32>),
    UploadStaticF32(Vec<f32>),
    EnableVertexAttrib(u32),
    VertexAttribF32 { index: u32, components: i32 },
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    Uniform1f { location: Option<u32>, value: f32 },
    DrawTriangles { first: i32, count: i32 },
}

impl Call {
    /// The calls the end-to-end contract is stated in terms of.
    pub fn is_milestone(&self) -> bool {
        matches!(
            self,
            Call::CreateProgram { .. }
                | Call::CompileShader { .. }
                | Call::LinkProgram { .. }
                | Call::UploadStaticF32(_)
                | Call::UniformLocation { .. }
                | Call::Viewport { .. }
                | Call::UseProgram(_)
                | Call::Uniform1f { .. }
                | Call::DrawTriangles { .. }
        )
    }
}

#[derive(Debug)]
struct ShaderObj {
    stage: ShaderStage,
    source: String,
    compiled: bool,
}

#[derive(Debug, Default)]
struct ProgramObj {
    attached: Vec<u32>,
    linked: bool,
    generation: u32,
    info_log: String,
    attribs: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    links: u32,
    shaders: HashMap<u32, ShaderObj>,
    deleted: Vec<u32>,
    programs: HashMap<u32, ProgramObj>,
    current: Option<u32>,
    bound_buffer: Option<u32>,
    error: Option<u32>,
    fail_create_buffer: bool,
    calls: Vec<Call>,
}

impl State {
    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn flag(&mut self, code: u32) {
        // GL keeps the first unread error.
        self.error.get_or_insert(code);
    }
}

#[derive(Debug, Default)]
pub struct RecordingGl {
    state: RefCell<State>,
}

fn declared_names(source: &str, keyword: &str) -> Vec<String> {
    source
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with(keyword))
        .filter_map(|l| l.trim_end_matches(';').split_whitespace().last())
        .map(str::to_string)
        .collect()
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `create_buffer` fail.
    pub fn fail_buffers(&self) {
        self.state.borrow_mut().fail_create_buffer = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn milestones(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_milestone).collect()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn is_deleted(&self, shader: u32) -> bool {
        self.state.borrow().deleted.contains(&shader)
    }

    pub fn attached(&self, program: u32) -> Vec<u32> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.attached.clone())
            .unwrap_or_default()
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl GlApi for RecordingGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type UniformLocation = u32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let id = s.alloc();
        s.shaders.insert(
            id,
            ShaderObj {
                stage,
                source: String::new(),
                compiled: false,
            },
        );
        s.calls.push(Call::CreateShader { stage, id });
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(obj) = self.state.borrow_mut().shaders.get_mut(&shader) {
            obj.source = source.to_string();
        }
        self.record(Call::ShaderSource { shader });
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(obj) = self.state.borrow_mut().shaders.get_mut(&shader) {
            obj.compiled = !obj.source.contains(COMPILE_ERROR_MARKER);
        }
        self.record(Call::CompileShader { shader });
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map_or(false, |s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            STUB_COMPILE_LOG.to_string()
        }
    }

    fn delete_shader(&self, shader: u32) {
        let mut s = self.state.borrow_mut();
        s.deleted.push(shader);
        s.calls.push(Call::DeleteShader { shader });
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let id = s.alloc();
        s.programs.insert(id, ProgramObj::default());
        s.calls.push(Call::CreateProgram { id });
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::AttachShader { program, shader });
        let stage = s.shaders.get(&shader).map(|o| o.stage);
        let clash = s.programs.get(&program).map_or(true, |p| {
            p.attached
                .iter()
                .any(|a| *a == shader || s.shaders.get(a).map(|o| o.stage) == stage)
        });
        if clash || stage.is_none() {
            s.flag(INVALID_OPERATION);
            return;
        }
        if let Some(p) = s.programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::DetachShader { program, shader });
        let removed = s.programs.get_mut(&program).map_or(false, |p| {
            let before = p.attached.len();
            p.attached.retain(|a| *a != shader);
            p.attached.len() != before
        });
        if !removed {
            s.flag(INVALID_OPERATION);
        }
    }

    fn link_program(&self, program: u32) {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::LinkProgram { program });

        let attached = match s.programs.get(&program) {
            Some(p) => p.attached.clone(),
            None => {
                s.flag(INVALID_OPERATION);
                return;
            }
        };
        let stage_src = |stage: ShaderStage| -> Vec<(bool, String)> {
            attached
                .iter()
                .filter_map(|id| s.shaders.get(id))
                .filter(|o| o.stage == stage)
                .map(|o| (o.compiled, o.source.clone()))
                .collect()
        };
        let vert = stage_src(ShaderStage::Vertex);
        let frag = stage_src(ShaderStage::Fragment);

        let complete = vert.len() == 1 && frag.len() == 1 && vert[0].0 && frag[0].0;
        let poisoned = vert
            .iter()
            .chain(&frag)
            .any(|(_, src)| src.contains(LINK_ERROR_MARKER));
        let ok = complete && !poisoned;
        if ok {
            s.links += 1;
        }
        let generation = s.links;
        let Some(p) = s.programs.get_mut(&program) else {
            return;
        };
        p.linked = ok;
        if ok {
            p.generation = generation;
            p.info_log.clear();
            p.attribs = declared_names(&vert[0].1, "attribute ");
            p.uniforms = declared_names(&vert[0].1, "uniform ");
            p.uniforms.extend(declared_names(&frag[0].1, "uniform "));
        } else if complete {
            p.info_log = STUB_LINK_LOG.into();
        } else {
            p.info_log = "error: program needs one compiled vertex and fragment shader".into();
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(false, |p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::UseProgram(program));
        match program {
            None => s.current = None,
            Some(id) if s.programs.get(&id).map_or(false, |p| p.linked) => s.current = Some(id),
            Some(_) => s.flag(INVALID_OPERATION),
        }
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        self.record(Call::AttribLocation {
            name: name.to_string(),
        });
        let s = self.state.borrow();
        let p = s.programs.get(&program).filter(|p| p.linked)?;
        let idx = p.attribs.iter().position(|a| a == name)? as u32;
        Some((p.generation - 1) * 2 + idx)
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        self.record(Call::UniformLocation {
            name: name.to_string(),
        });
        let s = self.state.borrow();
        let p = s.programs.get(&program).filter(|p| p.linked)?;
        let idx = p.uniforms.iter().position(|u| u == name)? as u32;
        Some(p.generation * 100 + idx)
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        if s.fail_create_buffer {
            return Err("out of memory".into());
        }
        let id = s.alloc();
        s.calls.push(Call::CreateBuffer { id });
        Ok(id)
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        let mut s = self.state.borrow_mut();
        s.bound_buffer = buffer;
        s.calls.push(Call::BindArrayBuffer(buffer));
    }

    fn upload_static_f32(&self, data: &[f32]) {
        let mut s = self.state.borrow_mut();
        if s.bound_buffer.is_none() {
            s.flag(INVALID_OPERATION);
        }
        s.calls.push(Call::UploadStaticF32(data.to_vec()));
    }

    fn enable_vertex_attrib(&self, index: u32) {
        self.record(Call::EnableVertexAttrib(index));
    }

    fn vertex_attrib_f32(&self, index: u32, components: i32) {
        self.record(Call::VertexAttribF32 { index, components });
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(Call::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn uniform_1_f32(&self, location: Option<&u32>, value: f32) {
        self.record(Call::Uniform1f {
            location: location.copied(),
            value,
        });
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        let mut s = self.state.borrow_mut();
        if s.current.is_none() {
            s.flag(INVALID_OPERATION);
        }
        s.calls.push(Call::DrawTriangles { first, count });
    }

    fn check_error(&self) -> Option<u32> {
        self.state.borrow_mut().error.take()
    }
}

/// Collects notifications; clones share the same log.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    messages: Rc<RefCell<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

/// Surface with a settable pixel size.
#[derive(Clone, Copy, Debug)]
pub struct FixedSurface {
    pub width: u32,
    pub height: u32,
}

impl FixedSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl DrawSurface for FixedSurface {
    fn pixel_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Hand-advanced clock for deterministic frame stepping.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}
