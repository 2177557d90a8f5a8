//! Screen capture.
//!
//! [`FrameSource`] is the seam the scheduler pulls pixel buffers through.
//! The production source is [`DxgiCapturer`], which uses the Direct3D 11
//! Desktop Duplication API to copy the whole primary display into a
//! CPU-readable BGRA buffer once per tick.
//!
//! # Platform
//!
//! DXGI capture is **Windows-only**. On other platforms the type still
//! exists but [`DxgiCapturer::open`] always fails, which the sender treats
//! as "no display available".

use crate::error::EdgeError;
use crate::types::PixelBuffer;

// ── FrameSource ──────────────────────────────────────────────────

/// Anything that can hand the scheduler one full-surface buffer per tick.
pub trait FrameSource {
    /// Acquire the current screen contents.
    ///
    /// [`EdgeError::Timeout`] means the surface has not changed since the
    /// previous call and is not fatal. Any other error is.
    fn capture_frame(&mut self) -> Result<PixelBuffer, EdgeError>;
}

// ── Display selection ────────────────────────────────────────────

/// Which output of the default adapter to duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    /// The output whose desktop origin is `(0, 0)`.
    #[default]
    Primary,
    /// An explicit output index.
    Index(u32),
}

// ── DxgiCapturer ─────────────────────────────────────────────────

/// DXGI-based full-screen capturer.
///
/// Wraps the `IDXGIOutputDuplication` pipeline:
///
/// 1. Create a D3D11 device.
/// 2. Pick the requested output, falling back to the first enumerated one.
/// 3. Create a CPU-readable staging texture.
/// 4. On each call to [`capture_frame`](FrameSource::capture_frame):
///    - `AcquireNextFrame` (blocks up to `timeout_ms`).
///    - Copy the desktop texture to the staging texture.
///    - Map, copy rows into a [`PixelBuffer`], unmap.
///
/// # Safety
///
/// All unsafe FFI calls are confined to this struct.
pub struct DxgiCapturer {
    width: u32,
    height: u32,
    timeout_ms: u32,

    #[cfg(target_os = "windows")]
    device: windows::Win32::Graphics::Direct3D11::ID3D11Device,
    #[cfg(target_os = "windows")]
    context: windows::Win32::Graphics::Direct3D11::ID3D11DeviceContext,
    #[cfg(target_os = "windows")]
    output: windows::Win32::Graphics::Dxgi::IDXGIOutput1,
    #[cfg(target_os = "windows")]
    duplication: windows::Win32::Graphics::Dxgi::IDXGIOutputDuplication,
    #[cfg(target_os = "windows")]
    staging_texture: windows::Win32::Graphics::Direct3D11::ID3D11Texture2D,
}

impl DxgiCapturer {
    /// Capture surface width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Capture surface height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

// ── Windows implementation ───────────────────────────────────────

#[cfg(target_os = "windows")]
mod platform {
    use super::*;
    use crate::types::PixelFormat;
    use windows::{
        core::Interface,
        Win32::Graphics::{
            Direct3D::D3D_DRIVER_TYPE_HARDWARE,
            Direct3D11::*,
            Dxgi::{Common::*, *},
        },
    };

    impl DxgiCapturer {
        /// Open a duplication of `display`.
        ///
        /// Falls back to output 0 if the requested output cannot be found,
        /// and fails with [`EdgeError::NoDisplay`] if there is none at all.
        pub fn open(display: Display, timeout_ms: u32) -> Result<Self, EdgeError> {
            unsafe { Self::init_dxgi(display, timeout_ms) }
        }

        unsafe fn init_dxgi(display: Display, timeout_ms: u32) -> Result<Self, EdgeError> {
            // 1. D3D11 device + immediate context.
            let mut device = None;
            let mut context = None;
            unsafe {
                D3D11CreateDevice(
                    None,
                    D3D_DRIVER_TYPE_HARDWARE,
                    None,
                    D3D11_CREATE_DEVICE_BGRA_SUPPORT,
                    None,
                    D3D11_SDK_VERSION,
                    Some(&mut device),
                    None,
                    Some(&mut context),
                )
                .map_err(|e| EdgeError::Capture(format!("D3D11CreateDevice failed: {e}")))?;
            }
            let device = device.ok_or_else(|| EdgeError::Capture("D3D11 device is None".into()))?;
            let context =
                context.ok_or_else(|| EdgeError::Capture("D3D11 context is None".into()))?;

            // 2. Device → adapter → output.
            let dxgi_device: IDXGIDevice = device
                .cast()
                .map_err(|e| EdgeError::Capture(format!("cast to IDXGIDevice failed: {e}")))?;
            let adapter = unsafe {
                dxgi_device
                    .GetAdapter()
                    .map_err(|e| EdgeError::Capture(format!("GetAdapter failed: {e}")))?
            };
            let output = unsafe { Self::select_output(&adapter, display)? };
            let output: IDXGIOutput1 = output
                .cast()
                .map_err(|e| EdgeError::Capture(format!("cast to IDXGIOutput1 failed: {e}")))?;

            // 3. Duplicate and size the staging texture to the output mode.
            let duplication = unsafe {
                output
                    .DuplicateOutput(&device)
                    .map_err(|e| EdgeError::Capture(format!("DuplicateOutput failed: {e}")))?
            };
            let dup_desc = unsafe { duplication.GetDesc() };
            let width = dup_desc.ModeDesc.Width;
            let height = dup_desc.ModeDesc.Height;
            let staging_texture = unsafe { Self::create_staging(&device, width, height)? };

            tracing::info!(width, height, "DXGI duplication opened");

            Ok(Self {
                width,
                height,
                timeout_ms,
                device,
                context,
                output,
                duplication,
                staging_texture,
            })
        }

        /// Find the requested output; otherwise the first one enumerated.
        unsafe fn select_output(
            adapter: &IDXGIAdapter,
            display: Display,
        ) -> Result<IDXGIOutput, EdgeError> {
            let mut outputs = Vec::new();
            let mut index = 0;
            while let Ok(output) = unsafe { adapter.EnumOutputs(index) } {
                outputs.push(output);
                index += 1;
            }
            if outputs.is_empty() {
                return Err(EdgeError::NoDisplay);
            }

            let wanted = match display {
                Display::Index(i) => outputs.get(i as usize).cloned(),
                Display::Primary => outputs
                    .iter()
                    .find(|o| {
                        unsafe { o.GetDesc() }.is_ok_and(|d| {
                            d.AttachedToDesktop.as_bool()
                                && d.DesktopCoordinates.left == 0
                                && d.DesktopCoordinates.top == 0
                        })
                    })
                    .cloned(),
            };

            match wanted {
                Some(output) => Ok(output),
                None => {
                    tracing::warn!(?display, "requested display unavailable; using first output");
                    Ok(outputs.swap_remove(0))
                }
            }
        }

        unsafe fn create_staging(
            device: &ID3D11Device,
            width: u32,
            height: u32,
        ) -> Result<ID3D11Texture2D, EdgeError> {
            let staging_desc = D3D11_TEXTURE2D_DESC {
                Width: width,
                Height: height,
                MipLevels: 1,
                ArraySize: 1,
                Format: DXGI_FORMAT_B8G8R8A8_UNORM,
                SampleDesc: DXGI_SAMPLE_DESC {
                    Count: 1,
                    Quality: 0,
                },
                Usage: D3D11_USAGE_STAGING,
                BindFlags: 0,
                CPUAccessFlags: D3D11_CPU_ACCESS_READ.0 as u32,
                MiscFlags: 0,
            };
            let mut texture = None;
            unsafe {
                device
                    .CreateTexture2D(&staging_desc, None, Some(&mut texture))
                    .map_err(|e| EdgeError::Capture(format!("CreateTexture2D failed: {e}")))?;
            }
            texture.ok_or_else(|| EdgeError::Capture("staging texture is None".into()))
        }

        /// Rebuild the duplication after the desktop switched (UAC prompt,
        /// mode change, lock screen).
        unsafe fn reopen(&mut self) -> Result<(), EdgeError> {
            let duplication = unsafe {
                self.output
                    .DuplicateOutput(&self.device)
                    .map_err(|e| EdgeError::Capture(format!("DuplicateOutput failed: {e}")))?
            };
            let desc = unsafe { duplication.GetDesc() };
            if desc.ModeDesc.Width != self.width || desc.ModeDesc.Height != self.height {
                self.width = desc.ModeDesc.Width;
                self.height = desc.ModeDesc.Height;
                self.staging_texture =
                    unsafe { Self::create_staging(&self.device, self.width, self.height)? };
            }
            self.duplication = duplication;
            tracing::info!(width = self.width, height = self.height, "DXGI duplication reopened");
            Ok(())
        }

        unsafe fn capture_inner(&mut self) -> Result<PixelBuffer, EdgeError> {
            let mut frame_info = DXGI_OUTDUPL_FRAME_INFO::default();
            let mut resource = None;
            let timeout = std::time::Duration::from_millis(u64::from(self.timeout_ms));

            match unsafe {
                self.duplication
                    .AcquireNextFrame(self.timeout_ms, &mut frame_info, &mut resource)
            } {
                Ok(()) => {}
                Err(e) if e.code() == DXGI_ERROR_WAIT_TIMEOUT => {
                    return Err(EdgeError::Timeout(timeout));
                }
                Err(e) if e.code() == DXGI_ERROR_ACCESS_LOST => {
                    unsafe { self.reopen()? };
                    return Err(EdgeError::Timeout(timeout));
                }
                Err(e) => {
                    return Err(EdgeError::Capture(format!("AcquireNextFrame failed: {e}")));
                }
            }

            let resource =
                resource.ok_or_else(|| EdgeError::Capture("acquired resource is None".into()))?;
            let texture: ID3D11Texture2D = resource.cast().map_err(|e| {
                let _ = unsafe { self.duplication.ReleaseFrame() };
                EdgeError::Capture(format!("cast to ID3D11Texture2D failed: {e}"))
            })?;

            unsafe { self.context.CopyResource(&self.staging_texture, &texture) };
            let _ = unsafe { self.duplication.ReleaseFrame() };

            let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
            unsafe {
                self.context
                    .Map(&self.staging_texture, 0, D3D11_MAP_READ, 0, Some(&mut mapped))
                    .map_err(|e| EdgeError::Capture(format!("Map failed: {e}")))?;
            }

            let stride = mapped.RowPitch as usize;
            let total_bytes = stride * self.height as usize;
            // SAFETY: a mapped staging texture exposes RowPitch × Height bytes
            // until Unmap, which happens right after the copy.
            let data = unsafe {
                std::slice::from_raw_parts(mapped.pData as *const u8, total_bytes).to_vec()
            };
            unsafe { self.context.Unmap(&self.staging_texture, 0) };

            PixelBuffer::new(self.width, self.height, stride, PixelFormat::Bgra8, data)
        }
    }

    impl FrameSource for DxgiCapturer {
        fn capture_frame(&mut self) -> Result<PixelBuffer, EdgeError> {
            unsafe { self.capture_inner() }
        }
    }
}

// ── Non-Windows stub ─────────────────────────────────────────────

#[cfg(not(target_os = "windows"))]
impl DxgiCapturer {
    /// DXGI is only available on Windows.
    pub fn open(_display: Display, _timeout_ms: u32) -> Result<Self, EdgeError> {
        Err(EdgeError::Capture(
            "DXGI Desktop Duplication is only available on Windows".into(),
        ))
    }
}

#[cfg(not(target_os = "windows"))]
impl FrameSource for DxgiCapturer {
    fn capture_frame(&mut self) -> Result<PixelBuffer, EdgeError> {
        let _ = self.timeout_ms;
        Err(EdgeError::NoDisplay)
    }
}
