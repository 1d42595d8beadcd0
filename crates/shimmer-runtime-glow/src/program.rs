use crate::api::{GlApi, ShaderStage};
use crate::notify::Notifier;
use crate::EngineError;

/// Compiles one stage. On failure the driver log is reported through `notifier` exactly once,
/// the object is deleted, and `None` is returned; callers carry on with the missing stage.
pub fn compile_shader<G: GlApi>(
    gl: &G,
    stage: ShaderStage,
    source: &str,
    notifier: &dyn Notifier,
) -> Option<G::Shader> {
    let shader = match gl.create_shader(stage) {
        Ok(s) => s,
        Err(e) => {
            let err = EngineError::GlCreate(format!("create_shader({stage}) failed: {e}"));
            notifier.notify(&err.to_string());
            return None;
        }
    };
    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if !gl.shader_compile_status(shader) {
        let log = gl.shader_info_log(shader);
        let err = match stage {
            ShaderStage::Vertex => EngineError::VertexCompile(log),
            ShaderStage::Fragment => EngineError::FragmentCompile(log),
        };
        notifier.notify(&err.to_string());
        gl.delete_shader(shader);
        return None;
    }

    Some(shader)
}

/// A program object plus the two shader objects linked into it.
///
/// The program object is created once and relinked in place when a stage is replaced.
#[derive(Debug)]
pub struct ShaderProgram<G: GlApi> {
    program: G::Program,
    vert: Option<G::Shader>,
    frag: Option<G::Shader>,
    attached: [Option<G::Shader>; 2],
    linked: bool,
}

impl<G: GlApi> ShaderProgram<G> {
    /// Creates the program object, compiles both stages and links.
    ///
    /// Only a failure to create the program object is an error; compile and link failures
    /// are reported through `notifier` and leave an unlinked program.
    pub fn new(
        gl: &G,
        vert_src: &str,
        frag_src: &str,
        notifier: &dyn Notifier,
    ) -> Result<Self, EngineError> {
        let program = gl
            .create_program()
            .map_err(|e| EngineError::GlCreate(format!("create_program failed: {e}")))?;

        let vert = compile_shader(gl, ShaderStage::Vertex, vert_src, notifier);
        let frag = compile_shader(gl, ShaderStage::Fragment, frag_src, notifier);

        let mut prog = Self {
            program,
            vert,
            frag,
            attached: [None, None],
            linked: false,
        };
        prog.attach_and_link(gl, notifier);
        Ok(prog)
    }

    /// Attaches the current stage objects and links. Returns the link status.
    pub fn attach_and_link(&mut self, gl: &G, notifier: &dyn Notifier) -> bool {
        for (slot, current) in [(0usize, self.vert), (1usize, self.frag)] {
            if self.attached[slot] == current {
                continue;
            }
            if let Some(stale) = self.attached[slot].take() {
                gl.detach_shader(self.program, stale);
            }
            if let Some(shader) = current {
                gl.attach_shader(self.program, shader);
                self.attached[slot] = Some(shader);
            }
        }

        gl.link_program(self.program);
        self.linked = gl.program_link_status(self.program);

        if !self.linked {
            let err = EngineError::Link(gl.program_info_log(self.program));
            notifier.notify(&err.to_string());
        }
        self.linked
    }

    /// Replaces one stage and relinks. The other stage's object is left exactly as it was.
    ///
    /// If the replacement does not compile, the previous object stays attached and the program
    /// is not relinked. Returns whether the program is linked afterwards with the new stage.
    pub fn load_new(
        &mut self,
        gl: &G,
        stage: ShaderStage,
        source: &str,
        notifier: &dyn Notifier,
    ) -> bool {
        let Some(replacement) = compile_shader(gl, stage, source, notifier) else {
            tracing::warn!(%stage, "shader reload rejected; keeping previous stage");
            return false;
        };
        let old = match stage {
            ShaderStage::Vertex => self.vert.replace(replacement),
            ShaderStage::Fragment => self.frag.replace(replacement),
        };

        let linked = self.attach_and_link(gl, notifier);

        // attach_and_link detached the old object; nothing references it anymore.
        if let Some(old) = old {
            gl.delete_shader(old);
        }
        tracing::debug!(%stage, linked, "reloaded shader stage");
        linked
    }

    pub fn bind(&self, gl: &G) {
        gl.use_program(Some(self.program));
    }

    pub fn program(&self) -> G::Program {
        self.program
    }

    pub fn shader(&self, stage: ShaderStage) -> Option<G::Shader> {
        match stage {
            ShaderStage::Vertex => self.vert,
            ShaderStage::Fragment => self.frag,
        }
    }

    /// Status of the most recent link attempt.
    pub fn is_linked(&self) -> bool {
        self.linked
    }
}
