//! Pipeline registry
//!
//! A pipeline is the unit of draw-state batching: the render queue groups
//! visible nodes by pipeline identity and brackets every contiguous run with
//! one `begin_batch` / `end_batch` pair. The registry owns pipelines in a
//! fixed-capacity pool; nodes only hold a [`PipelineId`].

use std::any::Any;
use std::fmt;

use crate::error::{SceneError, SceneResult};
use crate::foundation::memory::{PoolAllocator, PoolHandle};

use super::frame_data::FrameState;

/// Handle of a registered pipeline
pub type PipelineId = PoolHandle<PipelineEntry>;

/// Draw callbacks for one kind of node
///
/// `render` receives the node's payload and the current frame, whose
/// `model_view_projection` has already been set for that node.
pub trait RenderPipeline {
    /// Called once before a run of nodes sharing this pipeline
    fn begin_batch(&mut self, _frame: &FrameState) {}

    /// Draw one node
    fn render(&mut self, payload: &dyn Any, frame: &FrameState);

    /// Called once after the run
    fn end_batch(&mut self, _frame: &FrameState) {}
}

type BatchCallback = Box<dyn FnMut(&FrameState)>;
type RenderCallback = Box<dyn FnMut(&dyn Any, &FrameState)>;

/// Pipeline built from three closures
pub struct CallbackPipeline {
    begin: BatchCallback,
    render: RenderCallback,
    end: BatchCallback,
}

impl CallbackPipeline {
    /// Create a pipeline from begin, render and end callbacks
    pub fn new(
        begin: impl FnMut(&FrameState) + 'static,
        render: impl FnMut(&dyn Any, &FrameState) + 'static,
        end: impl FnMut(&FrameState) + 'static,
    ) -> Self {
        Self {
            begin: Box::new(begin),
            render: Box::new(render),
            end: Box::new(end),
        }
    }

    /// Create a pipeline with only a render callback
    pub fn from_render(render: impl FnMut(&dyn Any, &FrameState) + 'static) -> Self {
        Self::new(|_| {}, render, |_| {})
    }
}

impl RenderPipeline for CallbackPipeline {
    fn begin_batch(&mut self, frame: &FrameState) {
        (self.begin)(frame);
    }

    fn render(&mut self, payload: &dyn Any, frame: &FrameState) {
        (self.render)(payload, frame);
    }

    fn end_batch(&mut self, frame: &FrameState) {
        (self.end)(frame);
    }
}

impl fmt::Debug for CallbackPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackPipeline").finish_non_exhaustive()
    }
}

/// Registered pipeline with its alpha flag
pub struct PipelineEntry {
    pipeline: Box<dyn RenderPipeline>,
    has_alpha: bool,
}

impl PipelineEntry {
    /// Whether nodes using this pipeline go to the alpha queue
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub(crate) fn pipeline_mut(&mut self) -> &mut dyn RenderPipeline {
        self.pipeline.as_mut()
    }
}

impl fmt::Debug for PipelineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineEntry")
            .field("has_alpha", &self.has_alpha)
            .finish_non_exhaustive()
    }
}

/// Fixed-capacity pipeline storage
#[derive(Debug)]
pub struct PipelineRegistry {
    pipelines: PoolAllocator<PipelineEntry>,
}

impl PipelineRegistry {
    /// Create a registry with room for `capacity` pipelines
    pub fn new(capacity: usize) -> Self {
        Self {
            pipelines: PoolAllocator::new("Pipeline pool", capacity),
        }
    }

    /// Register a pipeline
    pub fn add(&mut self, pipeline: Box<dyn RenderPipeline>, has_alpha: bool) -> SceneResult<PipelineId> {
        let id = self.pipelines.allocate(PipelineEntry { pipeline, has_alpha })?;
        log::info!("Registered pipeline {:?} (alpha: {})", id, has_alpha);
        Ok(id)
    }

    /// Change which queue the pipeline's nodes are collected into
    ///
    /// Takes effect the next time a queue is built.
    pub fn set_alpha(&mut self, id: PipelineId, has_alpha: bool) -> SceneResult<()> {
        let entry = self.pipelines.get_mut(id).ok_or(SceneError::PipelineNotFound)?;
        entry.has_alpha = has_alpha;
        Ok(())
    }

    /// Release a pipeline slot
    ///
    /// Nodes still referring to it are skipped from then on.
    pub fn remove(&mut self, id: PipelineId) -> SceneResult<()> {
        self.pipelines.release(id).map_err(|_| SceneError::PipelineNotFound)?;
        log::info!("Deleted pipeline {:?}", id);
        Ok(())
    }

    /// Look up a pipeline
    pub fn get(&self, id: PipelineId) -> Option<&PipelineEntry> {
        self.pipelines.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: PipelineId) -> Option<&mut PipelineEntry> {
        self.pipelines.get_mut(id)
    }

    /// Whether `id` refers to a live pipeline
    pub fn contains(&self, id: PipelineId) -> bool {
        self.pipelines.contains(id)
    }

    /// Number of registered pipelines
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Whether no pipeline is registered
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::memory::PoolError;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_register_toggle_and_delete() {
        let mut registry = PipelineRegistry::new(4);
        let id = registry.add(Box::new(CallbackPipeline::from_render(|_, _| {})), false).unwrap();
        assert!(!registry.get(id).unwrap().has_alpha());

        registry.set_alpha(id, true).unwrap();
        assert!(registry.get(id).unwrap().has_alpha());

        registry.remove(id).unwrap();
        assert!(!registry.contains(id));
        assert_eq!(registry.set_alpha(id, false), Err(SceneError::PipelineNotFound));
        assert_eq!(registry.remove(id), Err(SceneError::PipelineNotFound));
    }

    #[test]
    fn test_registry_is_fixed_capacity() {
        let mut registry = PipelineRegistry::new(1);
        registry.add(Box::new(CallbackPipeline::from_render(|_, _| {})), false).unwrap();
        let err = registry.add(Box::new(CallbackPipeline::from_render(|_, _| {})), true).unwrap_err();
        assert!(matches!(err, SceneError::Pool(PoolError::Exhausted { capacity: 1, .. })));
    }

    #[test]
    fn test_callback_pipeline_forwards_calls() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let (b, r, e) = (Rc::clone(&calls), Rc::clone(&calls), Rc::clone(&calls));
        let mut pipeline = CallbackPipeline::new(
            move |_| b.borrow_mut().push("begin".to_string()),
            move |payload, _| r.borrow_mut().push(format!("render {}", payload.downcast_ref::<i32>().unwrap())),
            move |_| e.borrow_mut().push("end".to_string()),
        );

        let frame = FrameState::default();
        pipeline.begin_batch(&frame);
        pipeline.render(&7i32, &frame);
        pipeline.end_batch(&frame);

        assert_eq!(*calls.borrow(), vec!["begin", "render 7", "end"]);
    }
}
