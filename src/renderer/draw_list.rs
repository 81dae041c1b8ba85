use bytemuck::{Pod, Zeroable};

use super::arena::FrameArena;
use super::commands::{DrawCommand, PipelineState, ScissorRect};
use super::pass::PassList;
use crate::settings::DrawSubmission;

/// Layout of one `glMultiDrawElementsIndirect`-style command.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq, Eq, Default)]
pub struct DrawElementsIndirectCommand {
    pub count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub base_instance: u32,
}

/// Marks instance entries no visible object was written to.
pub const UNUSED_INSTANCE: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultidrawState {
    pub pipeline: PipelineState,
    pub texture_set: u32,
}

/// GPU-ready draw data for one pass as seen from one view.
#[derive(Debug, Default)]
pub struct RenderList {
    pub commands: Vec<DrawElementsIndirectCommand>,
    /// Commands per multidraw batch, in order.
    pub command_counts: Vec<u32>,
    pub multidraws: Vec<MultidrawState>,
    /// Registry slot per instance. Indexed by `base_instance + n`.
    pub instance_to_slot: Vec<u32>,
    /// Material GPU index per command.
    pub draw_to_material: Vec<u32>,
}

impl RenderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.command_counts.clear();
        self.multidraws.clear();
        self.instance_to_slot.clear();
        self.draw_to_material.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn instance_count(&self) -> u32 {
        self.commands.iter().map(|cmd| cmd.instance_count).sum()
    }

    pub fn triangle_count(&self) -> u64 {
        self.commands
            .iter()
            .map(|cmd| (cmd.count / 3) as u64 * cmd.instance_count as u64)
            .sum()
    }

    /// Compiles a batched pass. Objects whose slot is `false` in `visibility`
    /// are left out; their instance entries stay [`UNUSED_INSTANCE`].
    pub fn build_from(&mut self, arena: &mut FrameArena, pass: &PassList, visibility: Option<&[bool]>) {
        self.clear();
        if pass.mesh_batches.is_empty() {
            return;
        }

        let marker = arena.marker();
        let batch_count = pass.mesh_batches.len();
        let fill = arena.alloc(batch_count);

        let mut base_instance = 0u32;
        for multidraw in &pass.multidraw_batches {
            let first = multidraw.first_mesh_batch as usize;
            let batches = &pass.mesh_batches[first..first + multidraw.mesh_batch_count as usize];
            for batch in batches {
                self.commands.push(DrawElementsIndirectCommand {
                    count: batch.draw.index_count,
                    instance_count: 0,
                    first_index: batch.draw.first_index,
                    base_vertex: batch.draw.base_vertex,
                    base_instance,
                });
                self.draw_to_material.push(batch.material_gpu_index);
                base_instance += batch.object_count;
            }
            self.command_counts.push(multidraw.mesh_batch_count);
            self.multidraws.push(MultidrawState {
                pipeline: PipelineState::from(&multidraw.key),
                texture_set: multidraw.key.texture_set,
            });
        }

        self.instance_to_slot.resize(base_instance as usize, UNUSED_INSTANCE);

        for object in &pass.objects {
            let slot = object.slot as usize;
            if let Some(visible) = visibility {
                if !visible.get(slot).copied().unwrap_or(false) {
                    continue;
                }
            }

            let batch = object.batch as usize;
            let command = &self.commands[batch];
            self.instance_to_slot[(command.base_instance + fill[batch]) as usize] = object.slot;
            fill[batch] += 1;
        }

        for (command, count) in self.commands.iter_mut().zip(fill.iter()) {
            command.instance_count = *count;
        }
        arena.free_to_marker(marker);
    }

    /// Drops commands that ended up with no instances, keeping
    /// `draw_to_material` and `command_counts` aligned.
    pub fn collapse_zero_instance_commands(&mut self) {
        let mut read = 0;
        let mut write = 0;
        for count in &mut self.command_counts {
            let end = read + *count as usize;
            let mut kept = 0;
            while read < end {
                if self.commands[read].instance_count > 0 {
                    self.commands[write] = self.commands[read];
                    self.draw_to_material[write] = self.draw_to_material[read];
                    write += 1;
                    kept += 1;
                }
                read += 1;
            }
            *count = kept;
        }
        self.commands.truncate(write);
        self.draw_to_material.truncate(write);
    }

    /// Appends the backend commands for this list. Multidraw batches with no
    /// commands are skipped.
    pub fn encode(
        &self,
        submission: DrawSubmission,
        scissor: Option<ScissorRect>,
        out: &mut Vec<DrawCommand>,
    ) {
        if let Some(rect) = scissor {
            out.push(DrawCommand::SetScissor(rect));
        }

        let mut first_command = 0u32;
        for (state, &count) in self.multidraws.iter().zip(&self.command_counts) {
            let commands = first_command as usize..(first_command + count) as usize;
            first_command += count;
            if count == 0 {
                continue;
            }

            out.push(DrawCommand::SetPipeline(state.pipeline));
            out.push(DrawCommand::SetTexture {
                texture_set: state.texture_set,
            });

            match submission {
                DrawSubmission::Indirect => out.push(DrawCommand::MultiDrawIndirect {
                    first_command: commands.start as u32,
                    command_count: count,
                }),
                DrawSubmission::Discrete => {
                    for index in commands {
                        let command = &self.commands[index];
                        for n in 0..command.instance_count {
                            out.push(DrawCommand::DrawCall {
                                index_count: command.count,
                                first_index: command.first_index,
                                base_vertex: command.base_vertex,
                                instance: command.base_instance + n,
                                material: self.draw_to_material[index],
                            });
                        }
                    }
                }
            }
        }

        if scissor.is_some() {
            out.push(DrawCommand::ClearScissor);
        }
    }
}
