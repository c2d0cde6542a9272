use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, TryLockError,
};

use anyhow::{anyhow, bail, Context, Result};
use log::{info, warn};

use super::detector::Frame;

/// Webcam (or any frame source) the analysis loop samples from.
pub trait CameraDevice: Send {
    /// Acquire the device. Permission denial surfaces here.
    fn open(&mut self) -> Result<()>;

    fn capture(&mut self) -> Result<Frame>;

    fn release(&mut self);
}

struct LeaseInner {
    device: Mutex<Option<Box<dyn CameraDevice>>>,
    released: AtomicBool,
}

fn release_device(slot: &mut Option<Box<dyn CameraDevice>>) -> bool {
    match slot.take() {
        Some(mut device) => {
            device.release();
            true
        }
        None => false,
    }
}

impl LeaseInner {
    fn lock_device(&self) -> MutexGuard<'_, Option<Box<dyn CameraDevice>>> {
        match self.device.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Marks the lease released and frees the device unless a capture holds
    /// it; the capture then frees it when the read returns. Never blocks.
    fn request_release(&self) -> bool {
        if self.released.swap(true, Ordering::SeqCst) {
            return false;
        }

        match self.device.try_lock() {
            Ok(mut guard) => {
                release_device(&mut guard);
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                release_device(&mut poisoned.into_inner());
            }
            Err(TryLockError::WouldBlock) => {
                info!("Camera busy capturing; release deferred until the read returns");
            }
        }
        true
    }
}

impl Drop for LeaseInner {
    fn drop(&mut self) {
        let slot = match self.device.get_mut() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if release_device(slot) {
            info!("Camera released on drop");
        }
    }
}

/// Shared handle to an opened camera. The device is released exactly once,
/// by `release()` or when the last clone is dropped.
#[derive(Clone)]
pub struct CameraLease {
    inner: Arc<LeaseInner>,
}

impl CameraLease {
    pub fn acquire(mut device: Box<dyn CameraDevice>) -> Result<Self> {
        device.open().context("failed to open camera")?;
        info!("Camera acquired");
        Ok(Self {
            inner: Arc::new(LeaseInner {
                device: Mutex::new(Some(device)),
                released: AtomicBool::new(false),
            }),
        })
    }

    /// Blocking; run it off the async executor.
    pub fn capture(&self) -> Result<Frame> {
        if self.inner.released.load(Ordering::SeqCst) {
            bail!("camera already released");
        }

        let frame = {
            let mut guard = self
                .inner
                .device
                .lock()
                .map_err(|_| anyhow!("camera lock poisoned"))?;
            let device = guard
                .as_mut()
                .ok_or_else(|| anyhow!("camera already released"))?;
            device.capture()
        };

        // A release requested mid-read was deferred to us.
        if self.inner.released.load(Ordering::SeqCst)
            && release_device(&mut self.inner.lock_device())
        {
            info!("Camera released after in-flight capture");
        }
        frame
    }

    /// Returns immediately, even while a capture is blocked on the device.
    pub fn release(&self) {
        if self.inner.request_release() {
            info!("Camera released");
        } else {
            warn!("Camera release requested but device was already released");
        }
    }

    pub fn is_held(&self) -> bool {
        !self.inner.released.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sensing::detector::FrameReadiness;
    use image::RgbImage;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    /// Test camera recording open/release calls into shared flags.
    #[derive(Clone, Default)]
    pub(crate) struct FakeCamera {
        pub opened: Arc<AtomicBool>,
        pub releases: Arc<AtomicUsize>,
        pub captures: Arc<AtomicUsize>,
        pub deny_permission: bool,
    }

    impl CameraDevice for FakeCamera {
        fn open(&mut self) -> Result<()> {
            if self.deny_permission {
                return Err(anyhow!("NotAllowedError: permission denied"));
            }
            self.opened.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn capture(&mut self) -> Result<Frame> {
            self.captures.fetch_add(1, Ordering::SeqCst);
            Ok(Frame::new(RgbImage::new(320, 240), FrameReadiness::Ready))
        }

        fn release(&mut self) {
            self.opened.store(false, Ordering::SeqCst);
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Camera whose reads block the calling thread for `delay`.
    #[derive(Clone, Default)]
    pub(crate) struct SlowCamera {
        pub inner: FakeCamera,
        pub delay: Duration,
        pub reading: Arc<AtomicBool>,
    }

    impl CameraDevice for SlowCamera {
        fn open(&mut self) -> Result<()> {
            self.inner.open()
        }

        fn capture(&mut self) -> Result<Frame> {
            self.reading.store(true, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.reading.store(false, Ordering::SeqCst);
            self.inner.capture()
        }

        fn release(&mut self) {
            self.inner.release()
        }
    }

    pub(crate) fn wait_until(flag: &AtomicBool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !flag.load(Ordering::SeqCst) {
            assert!(Instant::now() < deadline, "timed out waiting for flag");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn release_does_not_wait_for_a_stuck_capture() {
        let camera = SlowCamera {
            delay: Duration::from_millis(500),
            ..Default::default()
        };
        let lease = CameraLease::acquire(Box::new(camera.clone())).unwrap();

        let reader = {
            let lease = lease.clone();
            std::thread::spawn(move || lease.capture())
        };
        wait_until(&camera.reading);

        let started = Instant::now();
        lease.release();
        assert!(started.elapsed() < Duration::from_millis(250));
        assert!(!lease.is_held());
        assert_eq!(camera.inner.releases.load(Ordering::SeqCst), 0);

        assert!(reader.join().unwrap().is_ok());
        assert!(!camera.inner.opened.load(Ordering::SeqCst));
        assert_eq!(camera.inner.releases.load(Ordering::SeqCst), 1);
        assert!(lease.capture().is_err());

        drop(lease);
        assert_eq!(camera.inner.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn explicit_release_happens_once() {
        let camera = FakeCamera::default();
        let lease = CameraLease::acquire(Box::new(camera.clone())).unwrap();
        assert!(camera.opened.load(Ordering::SeqCst));

        lease.release();
        lease.release();
        drop(lease);

        assert!(!camera.opened.load(Ordering::SeqCst));
        assert_eq!(camera.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_last_clone_releases() {
        let camera = FakeCamera::default();
        let lease = CameraLease::acquire(Box::new(camera.clone())).unwrap();
        let clone = lease.clone();

        drop(lease);
        assert_eq!(camera.releases.load(Ordering::SeqCst), 0);
        assert!(clone.is_held());

        drop(clone);
        assert_eq!(camera.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn capture_after_release_fails() {
        let lease = CameraLease::acquire(Box::new(FakeCamera::default())).unwrap();
        assert!(lease.capture().is_ok());

        lease.release();
        assert!(lease.capture().is_err());
    }

    #[test]
    fn permission_denial_is_an_error() {
        let camera = FakeCamera {
            deny_permission: true,
            ..Default::default()
        };
        assert!(CameraLease::acquire(Box::new(camera)).is_err());
    }
}
