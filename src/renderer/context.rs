use log::info;

use super::arena::FrameArena;
use crate::jobs::{JobError, JobSystem};
use crate::settings::RenderSettings;

/// Process-wide frame state: the worker pool, the scratch arena and the
/// active settings. Created once at startup and passed to every frame build.
pub struct RenderContext {
    pub jobs: JobSystem,
    pub arena: FrameArena,
    settings: RenderSettings,
}

impl RenderContext {
    pub fn new(settings: RenderSettings) -> Result<Self, JobError> {
        let jobs = JobSystem::new(settings.worker_threads, settings.synchronous_jobs)?;
        let arena = FrameArena::new(settings.scratch_arena_words);
        info!(
            "Render context ready: {} workers, {} scratch words, {:?} submission",
            jobs.worker_count(),
            arena.capacity(),
            settings.draw_submission
        );
        Ok(Self {
            jobs,
            arena,
            settings,
        })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Applies new settings. The scratch arena is reallocated if its size
    /// changed; the worker count is fixed for the context's lifetime.
    pub fn apply_settings(&mut self, settings: RenderSettings) {
        self.jobs.set_synchronous(settings.synchronous_jobs);
        if settings.scratch_arena_words != self.arena.capacity() {
            self.arena = FrameArena::new(settings.scratch_arena_words);
        }
        self.settings = settings;
    }

    pub fn begin_frame(&mut self) {
        self.arena.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_settings_toggles_synchronous_mode_and_resizes_arena() {
        let mut ctx = RenderContext::new(RenderSettings {
            worker_threads: 1,
            scratch_arena_words: 64,
            ..RenderSettings::default()
        })
        .unwrap();
        assert!(!ctx.jobs.is_synchronous());

        ctx.apply_settings(RenderSettings {
            worker_threads: 1,
            synchronous_jobs: true,
            scratch_arena_words: 128,
            ..RenderSettings::default()
        });
        assert!(ctx.jobs.is_synchronous());
        assert_eq!(ctx.arena.capacity(), 128);
        assert!(ctx.settings().synchronous_jobs);
    }
}
