//! Gesture labels, and the background classifier that produces them.
//!
//! The classifier runs on its own thread at its own cadence and publishes
//! into a [`LatestLabel`]. The frame loop reads whatever was published last.
//! Labels are never queued.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

use crate::camera::{FrameView, VideoFrameSource};

/// A classifier output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Label {
    /// Trigger gesture: launch fireworks.
    ClapHands,
    /// Hands out of frame: clear fireworks.
    Still,
    Other(String),
}

impl Label {
    pub fn as_str(&self) -> &str {
        match self {
            Label::ClapHands => "claphands",
            Label::Still => "still",
            Label::Other(name) => name,
        }
    }
}

impl FromStr for Label {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "claphands" => Label::ClapHands,
            "still" => Label::Still,
            other => Label::Other(other.to_string()),
        })
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(label) => label,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-slot, last-write-wins label cell shared between the classifier
/// thread and the frame loop.
#[derive(Clone, Default)]
pub struct LatestLabel {
    slot: Arc<Mutex<Option<Label>>>,
}

impl LatestLabel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, label: Label) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(label);
    }

    /// The most recent label, or `None` if nothing has been published yet.
    pub fn latest(&self) -> Option<Label> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Anything that turns video frames into labels.
pub trait ClassificationSource: Send + 'static {
    /// Classify continuously until `stop` is set, calling `on_result` for
    /// every new label.
    fn run(
        self: Box<Self>,
        frames: Arc<dyn VideoFrameSource>,
        on_result: &mut dyn FnMut(Label),
        stop: &AtomicBool,
    );
}

/// A classifier running on its own thread. Dropping the handle stops it.
pub struct ClassifierHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ClassifierHandle {
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for ClassifierHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawn `source` on a background thread.
pub fn start<C, F>(source: C, frames: Arc<dyn VideoFrameSource>, mut on_result: F) -> ClassifierHandle
where
    C: ClassificationSource,
    F: FnMut(Label) + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let thread_stop = Arc::clone(&stop);
    let thread = thread::spawn(move || {
        Box::new(source).run(frames, &mut on_result, &thread_stop);
    });

    ClassifierHandle {
        stop,
        thread: Some(thread),
    }
}

/// Classifies by how much of the frame is covered by skin-toned pixels.
///
/// Large coverage means two hands brought together in front of the camera,
/// none means nobody is there. Anything in between is reported as `hands`.
pub struct PresenceClassifier {
    interval: Duration,
    /// Sample every n-th pixel in each direction
    stride: u32,
    clap_coverage: f32,
    still_coverage: f32,
}

impl PresenceClassifier {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            stride: 8,
            clap_coverage: 0.08,
            still_coverage: 0.01,
        }
    }

    pub fn classify(&self, frame: &dyn FrameView, width: u32, height: u32) -> Label {
        let coverage = skin_coverage(frame, width, height, self.stride);
        if coverage >= self.clap_coverage {
            Label::ClapHands
        } else if coverage < self.still_coverage {
            Label::Still
        } else {
            Label::Other("hands".to_string())
        }
    }
}

impl ClassificationSource for PresenceClassifier {
    fn run(
        self: Box<Self>,
        frames: Arc<dyn VideoFrameSource>,
        on_result: &mut dyn FnMut(Label),
        stop: &AtomicBool,
    ) {
        info!(interval_ms = self.interval.as_millis() as u64, "classifier started");
        let (width, height) = frames.size();
        let mut last: Option<Label> = None;

        while !stop.load(Ordering::Relaxed) {
            let label = self.classify(&*frames.frame(), width, height);
            if last.as_ref() != Some(&label) {
                debug!(%label, "classification changed");
                last = Some(label.clone());
            }
            on_result(label);
            thread::sleep(self.interval);
        }
        info!("classifier stopped");
    }
}

fn is_skin((r, g, b): (u8, u8, u8)) -> bool {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    r > 95 && g > 40 && b > 20 && r > g && r > b && r - g > 15 && max - min > 15
}

fn skin_coverage(frame: &dyn FrameView, width: u32, height: u32, stride: u32) -> f32 {
    let mut hits = 0u32;
    let mut total = 0u32;
    for y in (0..height).step_by(stride as usize) {
        for x in (0..width).step_by(stride as usize) {
            total += 1;
            if is_skin(frame.pixel(x, y)) {
                hits += 1;
            }
        }
    }
    if total == 0 { 0.0 } else { hits as f32 / total as f32 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{HandPose, SyntheticCamera};
    use std::sync::mpsc;

    #[test]
    fn test_label_parsing() {
        assert_eq!(Label::from("claphands"), Label::ClapHands);
        assert_eq!(Label::from("still"), Label::Still);
        assert_eq!(Label::from("wave"), Label::Other("wave".to_string()));
        assert_eq!(Label::from("wave").to_string(), "wave");
        assert_eq!(Label::ClapHands.as_str(), "claphands");
    }

    #[test]
    fn test_latest_label_last_write_wins() {
        let slot = LatestLabel::new();
        assert_eq!(slot.latest(), None);

        let writer = slot.clone();
        writer.publish(Label::Still);
        writer.publish(Label::ClapHands);
        assert_eq!(slot.latest(), Some(Label::ClapHands));
        // Reading doesn't consume.
        assert_eq!(slot.latest(), Some(Label::ClapHands));
    }

    #[test]
    fn test_classifies_each_pose() {
        let cam = SyntheticCamera::new(9);
        let classifier = PresenceClassifier::new(Duration::from_millis(10));

        let cases = [
            (HandPose::Out, Label::Still),
            (HandPose::Raised, Label::Other("hands".to_string())),
            (HandPose::Clapping, Label::ClapHands),
        ];
        for (pose, expected) in cases {
            cam.set_pose(pose);
            let label = classifier.classify(&*cam.frame(), 640, 480);
            assert_eq!(label, expected, "pose {pose:?}");
        }
    }

    #[test]
    fn test_skin_rule() {
        assert!(is_skin((224, 172, 140)));
        assert!(!is_skin((30, 35, 50)));
        assert!(!is_skin((255, 255, 255)));
    }

    #[test]
    fn test_background_thread_publishes_and_stops() {
        let cam = Arc::new(SyntheticCamera::new(10));
        cam.set_pose(HandPose::Clapping);

        let (tx, rx) = mpsc::channel();
        let mut handle = start(
            PresenceClassifier::new(Duration::from_millis(5)),
            cam,
            move |label| {
                let _ = tx.send(label);
            },
        );

        let label = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(label, Label::ClapHands);

        handle.stop();
        // Drain whatever was sent before the stop, then the channel closes.
        while rx.recv_timeout(Duration::from_secs(5)).is_ok() {}
    }
}
