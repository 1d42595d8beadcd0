#![forbid(unsafe_code)]

pub mod recording;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shimmer_core::EngineError;
    use shimmer_runtime_glow::{
        compile_shader, CancelToken, CanvasRenderer, Clock, GlApi, LoopControl, RenderLoop,
        ShaderProgram, ShaderSource, ShaderStage, DEFAULT_FRAG, DEFAULT_VERT, QUAD_POSITIONS,
        QUAD_TEXCOORDS,
    };

    use crate::recording::{
        Call, FixedSurface, ManualClock, RecordingGl, RecordingNotifier, COMPILE_ERROR_MARKER,
        INVALID_OPERATION, LINK_ERROR_MARKER, STUB_COMPILE_LOG, STUB_LINK_LOG,
    };

    const FRAME: Duration = Duration::from_millis(16);

    type TestRenderer<'a> = CanvasRenderer<RecordingGl, FixedSurface, &'a ManualClock>;

    fn renderer<'a>(
        clock: &'a ManualClock,
        notifier: &RecordingNotifier,
        source: &ShaderSource,
        surface: FixedSurface,
    ) -> TestRenderer<'a> {
        CanvasRenderer::new(
            RecordingGl::new(),
            surface,
            clock,
            Box::new(notifier.clone()),
            source,
        )
        .expect("renderer should build against the recorder")
    }

    fn broken_frag() -> String {
        format!("{COMPILE_ERROR_MARKER}\n{DEFAULT_FRAG}")
    }

    fn frame_calls(w: i32, h: i32, elapsed: Duration, delta: Duration) -> Vec<Call> {
        vec![
            Call::Viewport {
                x: 0,
                y: 0,
                width: w,
                height: h,
            },
            Call::UseProgram(Some(1)),
            Call::Uniform1f {
                location: Some(100),
                value: elapsed.as_secs_f32(),
            },
            Call::Uniform1f {
                location: Some(101),
                value: delta.as_secs_f32(),
            },
            Call::DrawTriangles { first: 0, count: 6 },
        ]
    }

    // ---- ShaderProgram contracts ----

    #[test]
    fn valid_pair_links_and_draws_without_error_flag() {
        let gl = RecordingGl::new();
        let notifier = RecordingNotifier::new();

        let program = ShaderProgram::new(&gl, DEFAULT_VERT, DEFAULT_FRAG, &notifier)
            .expect("program object");
        assert!(program.is_linked());
        assert!(notifier.messages().is_empty());

        program.bind(&gl);
        gl.draw_triangles(0, 6);
        assert_eq!(gl.check_error(), None);
        assert_eq!(gl.current_program(), Some(program.program()));
    }

    #[test]
    fn stub_flags_binding_an_unlinked_program() {
        let gl = RecordingGl::new();
        let notifier = RecordingNotifier::new();
        let program =
            ShaderProgram::new(&gl, DEFAULT_VERT, &broken_frag(), &notifier).expect("program");
        assert!(!program.is_linked());

        program.bind(&gl);
        assert_eq!(gl.check_error(), Some(INVALID_OPERATION));
    }

    #[test]
    fn invalid_fragment_reports_driver_log_once() {
        let gl = RecordingGl::new();
        let notifier = RecordingNotifier::new();

        let shader = compile_shader(&gl, ShaderStage::Fragment, &broken_frag(), &notifier);
        assert!(shader.is_none());

        let messages = notifier.messages();
        assert_eq!(messages.len(), 1, "got: {messages:?}");
        assert!(messages[0].contains(STUB_COMPILE_LOG));
        assert!(messages[0].starts_with("fragment shader compile error"));
    }

    #[test]
    fn failed_stage_leaves_program_unlinked_with_link_diagnostic() {
        let gl = RecordingGl::new();
        let notifier = RecordingNotifier::new();

        let program =
            ShaderProgram::new(&gl, DEFAULT_VERT, &broken_frag(), &notifier).expect("program");
        assert!(program.shader(ShaderStage::Fragment).is_none());
        assert!(program.shader(ShaderStage::Vertex).is_some());

        let messages = notifier.messages();
        assert_eq!(messages.len(), 2, "got: {messages:?}");
        assert!(messages[0].contains("compile error"));
        assert!(messages[1].starts_with("program link error"));
    }

    #[test]
    fn load_new_fragment_keeps_vertex_handle() {
        let gl = RecordingGl::new();
        let notifier = RecordingNotifier::new();
        let mut program =
            ShaderProgram::new(&gl, DEFAULT_VERT, DEFAULT_FRAG, &notifier).expect("program");

        let vert_before = program.shader(ShaderStage::Vertex);
        let frag_before = program.shader(ShaderStage::Fragment).expect("frag");

        let replacement = DEFAULT_FRAG.replace("1.0471", "2.0");
        assert!(program.load_new(&gl, ShaderStage::Fragment, &replacement, &notifier));

        let frag_after = program.shader(ShaderStage::Fragment).expect("frag");
        assert_eq!(program.shader(ShaderStage::Vertex), vert_before);
        assert_ne!(frag_after, frag_before);
        assert!(gl.is_deleted(frag_before));
        assert!(!gl.is_deleted(vert_before.unwrap()));

        let mut attached = gl.attached(program.program());
        attached.sort_unstable();
        assert_eq!(attached, vec![vert_before.unwrap(), frag_after]);
        assert_eq!(gl.check_error(), None, "relink must not double-attach");
        assert!(notifier.messages().is_empty());
    }

    #[test]
    fn load_new_with_broken_source_keeps_running_program() {
        let gl = RecordingGl::new();
        let notifier = RecordingNotifier::new();
        let mut program =
            ShaderProgram::new(&gl, DEFAULT_VERT, DEFAULT_FRAG, &notifier).expect("program");
        let frag_before = program.shader(ShaderStage::Fragment);
        gl.clear_calls();

        assert!(!program.load_new(&gl, ShaderStage::Fragment, &broken_frag(), &notifier));

        assert_eq!(program.shader(ShaderStage::Fragment), frag_before);
        assert!(program.is_linked());
        assert_eq!(notifier.messages().len(), 1);
        assert!(!gl
            .calls()
            .iter()
            .any(|c| matches!(c, Call::LinkProgram { .. })));
    }

    // ---- Renderer contracts ----

    #[test]
    fn construction_then_frames_follow_the_call_contract() {
        let clock = ManualClock::new();
        let notifier = RecordingNotifier::new();
        let mut r = renderer(
            &clock,
            &notifier,
            &ShaderSource::default(),
            FixedSurface::new(800, 600),
        );

        let mut expected = vec![
            Call::CreateProgram { id: 1 },
            Call::CompileShader { shader: 2 },
            Call::CompileShader { shader: 3 },
            Call::LinkProgram { program: 1 },
            Call::UploadStaticF32(QUAD_TEXCOORDS.to_vec()),
            Call::UploadStaticF32(QUAD_POSITIONS.to_vec()),
            Call::UniformLocation {
                name: "u_time".into(),
            },
            Call::UniformLocation {
                name: "u_deltaTime".into(),
            },
        ];
        assert_eq!(r.gl().milestones(), expected);

        for n in 1..=3u32 {
            clock.advance(FRAME);
            r.render();
            expected.extend(frame_calls(800, 600, FRAME * n, FRAME));
        }
        assert_eq!(r.gl().milestones(), expected);
        assert_eq!(r.frames(), 3);
        assert!(notifier.messages().is_empty());
    }

    #[test]
    fn quad_buffers_do_not_depend_on_surface_size() {
        let uploads = |w, h| {
            let clock = ManualClock::new();
            let r = renderer(
                &clock,
                &RecordingNotifier::new(),
                &ShaderSource::default(),
                FixedSurface::new(w, h),
            );
            r.gl()
                .calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::UploadStaticF32(data) => Some(data),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };

        let small = uploads(1, 1);
        let large = uploads(3840, 2160);
        assert_eq!(small, large);
        assert_eq!(small.len(), 2);
        assert!(small.iter().all(|d| d.len() == 12));
    }

    #[test]
    fn attributes_are_described_as_tight_vec2_floats() {
        let clock = ManualClock::new();
        let r = renderer(
            &clock,
            &RecordingNotifier::new(),
            &ShaderSource::default(),
            FixedSurface::new(4, 4),
        );
        let described: Vec<Call> = r
            .gl()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::VertexAttribF32 { .. }))
            .collect();
        let attribs = r.attribs();
        assert_eq!(
            described,
            vec![
                Call::VertexAttribF32 {
                    index: attribs.texcoord.unwrap(),
                    components: 2
                },
                Call::VertexAttribF32 {
                    index: attribs.position.unwrap(),
                    components: 2
                },
            ]
        );
    }

    #[test]
    fn elapsed_is_measured_from_construction() {
        let clock = ManualClock::new();
        clock.set(Duration::from_secs(42));
        let mut r = renderer(
            &clock,
            &RecordingNotifier::new(),
            &ShaderSource::default(),
            FixedSurface::new(4, 4),
        );

        let mut last = 0.0f32;
        for step in [10u64, 0, 250, 1000] {
            clock.advance(Duration::from_millis(step));
            let t = r.render();
            let since_load = clock.now() - Duration::from_secs(42);
            assert_eq!(t.elapsed, since_load.as_secs_f32());
            assert!(t.elapsed >= last);
            last = t.elapsed;
        }
    }

    #[test]
    fn viewport_tracks_surface_resizes() {
        let clock = ManualClock::new();
        let mut r = renderer(
            &clock,
            &RecordingNotifier::new(),
            &ShaderSource::default(),
            FixedSurface::new(640, 480),
        );
        r.render();
        *r.surface_mut() = FixedSurface::new(1280, 720);
        r.render();

        let viewports: Vec<Call> = r
            .gl()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Viewport { .. }))
            .collect();
        assert_eq!(
            viewports,
            vec![
                Call::Viewport {
                    x: 0,
                    y: 0,
                    width: 640,
                    height: 480
                },
                Call::Viewport {
                    x: 0,
                    y: 0,
                    width: 1280,
                    height: 720
                },
            ]
        );
    }

    #[test]
    fn reload_re_resolves_uniform_locations() {
        let clock = ManualClock::new();
        let notifier = RecordingNotifier::new();
        let mut r = renderer(
            &clock,
            &notifier,
            &ShaderSource::default(),
            FixedSurface::new(4, 4),
        );
        assert_eq!(r.uniforms().time, Some(100));

        let replacement = DEFAULT_FRAG.replace("2.0943", "3.0");
        assert!(r.reload_stage(ShaderStage::Fragment, &replacement));
        assert_eq!(r.uniforms().time, Some(200));
        assert_eq!(r.uniforms().delta_time, Some(201));

        r.gl().clear_calls();
        clock.advance(FRAME);
        r.render();
        let uploads: Vec<Option<u32>> = r
            .gl()
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Uniform1f { location, .. } => Some(location),
                _ => None,
            })
            .collect();
        assert_eq!(uploads, vec![Some(200), Some(201)]);
        assert_eq!(r.gl().check_error(), None);
        assert!(notifier.messages().is_empty());
    }

    #[test]
    fn failed_relink_keeps_previous_locations_until_a_good_reload() {
        let clock = ManualClock::new();
        let notifier = RecordingNotifier::new();
        let mut r = renderer(
            &clock,
            &notifier,
            &ShaderSource::default(),
            FixedSurface::new(4, 4),
        );
        let frag_before = r.program().shader(ShaderStage::Fragment).expect("frag");
        let attribs_before = r.attribs();

        let mismatched = format!("{DEFAULT_FRAG}\n{LINK_ERROR_MARKER}\n");
        assert!(!r.reload_stage(ShaderStage::Fragment, &mismatched));
        assert!(!r.program().is_linked());
        assert!(r.gl().is_deleted(frag_before));

        let messages = notifier.messages();
        assert_eq!(messages.len(), 1, "got: {messages:?}");
        assert!(messages[0].starts_with("program link error"));
        assert!(messages[0].contains(STUB_LINK_LOG));
        assert_eq!(r.uniforms().time, Some(100));
        assert_eq!(r.uniforms().delta_time, Some(101));
        assert_eq!(r.attribs(), attribs_before);

        r.gl().clear_calls();
        clock.advance(FRAME);
        r.render();
        let draws = r
            .gl()
            .calls()
            .into_iter()
            .filter(|c| *c == Call::DrawTriangles { first: 0, count: 6 })
            .count();
        assert_eq!(draws, 1);

        assert!(r.reload_stage(ShaderStage::Fragment, DEFAULT_FRAG));
        assert!(r.program().is_linked());
        assert_eq!(r.uniforms().time, Some(200));
        assert_eq!(r.uniforms().delta_time, Some(201));
        assert_eq!(notifier.messages().len(), 1);
    }

    #[test]
    fn broken_default_pair_still_constructs() {
        let clock = ManualClock::new();
        let notifier = RecordingNotifier::new();
        let source = ShaderSource {
            frag: broken_frag(),
            ..ShaderSource::default()
        };
        let mut r = renderer(&clock, &notifier, &source, FixedSurface::new(4, 4));
        assert!(!r.program().is_linked());
        assert_eq!(r.uniforms().time, None);

        r.render();
        assert_eq!(r.frames(), 1);
        assert_eq!(notifier.messages().len(), 2);
    }

    #[test]
    fn buffer_creation_failure_is_an_error() {
        let gl = RecordingGl::new();
        gl.fail_buffers();
        let clock = ManualClock::new();
        let err = CanvasRenderer::new(
            gl,
            FixedSurface::new(4, 4),
            &clock,
            Box::new(RecordingNotifier::new()),
            &ShaderSource::default(),
        )
        .expect_err("buffer failure must surface");
        assert!(matches!(err, EngineError::GlCreate(_)), "got: {err}");
    }

    // ---- RenderLoop contracts ----

    #[test]
    fn cancelled_loop_renders_nothing_more() {
        let clock = ManualClock::new();
        let r = renderer(
            &clock,
            &RecordingNotifier::new(),
            &ShaderSource::default(),
            FixedSurface::new(4, 4),
        );
        let token = CancelToken::new();
        let mut lp = RenderLoop::new(r, token.clone());

        assert_eq!(lp.tick(), LoopControl::Continue);
        assert_eq!(lp.tick(), LoopControl::Continue);
        token.cancel();
        assert_eq!(lp.tick(), LoopControl::Stop);
        assert_eq!(lp.tick(), LoopControl::Stop);

        let draws = lp
            .renderer()
            .gl()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::DrawTriangles { .. }))
            .count();
        assert_eq!(draws, 2);
        assert_eq!(lp.renderer().frames(), 2);
    }
}
