//! Win32 host: a hidden message window whose procedure forwards tray
//! messages into the dispatcher queue, plus the `Shell_NotifyIconW`
//! backend that realizes the shell contract bit-exactly.

use super::{HostHandles, TrayHost};
use crate::shell::{self, Glyph, Shell, ShellOp, ShellRequest};
use crate::tray::icon::CALLBACK_MESSAGE;
use crate::tray::menu::PopupMenu;
use crate::tray::message::{MenuCommand, TrayMessage};
use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, WPARAM};
use windows::Win32::Graphics::Gdi::{CreateBitmap, DeleteObject, HBITMAP};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Shell::{
    Shell_NotifyIconW, NIF_ICON, NIF_INFO, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NIM_MODIFY,
    NIN_BALLOONSHOW, NOTIFYICONDATAW, NOTIFY_ICON_DATA_FLAGS, NOTIFY_ICON_MESSAGE,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreateIconIndirect, CreatePopupMenu, CreateWindowExW, DefWindowProcW,
    DestroyMenu, DispatchMessageW, GetCursorPos, GetMessageW, PostMessageW, PostQuitMessage,
    RegisterClassW, SetForegroundWindow, SetMenuDefaultItem, TrackPopupMenu, TranslateMessage,
    ENDSESSION_LOGOFF, HICON, ICONINFO, MF_GRAYED, MF_STRING, MSG, TPM_BOTTOMALIGN, TPM_LEFTALIGN,
    TPM_RIGHTBUTTON, WINDOW_EX_STYLE, WINDOW_STYLE, WM_APP, WM_CLOSE, WM_COMMAND, WM_DESTROY,
    WM_LBUTTONDBLCLK, WM_QUERYENDSESSION, WM_RBUTTONUP, WNDCLASSW,
};

/// Internal request to run the popup-menu dance on the pump thread,
/// where the blocking `TrackPopupMenu` call must live.
const WM_SHOWMENU: u32 = WM_APP + 1;

const ICON_SIZE: i32 = 32;

/// What the window procedure needs to route messages for one window.
struct Route {
    tx: UnboundedSender<TrayMessage>,
    menu: Arc<PopupMenu>,
    /// Display duration of the most recent balloon request, attached to
    /// `BalloonShown` because the shell's own notification carries none.
    balloon_timeout: Arc<Mutex<Duration>>,
}

/// Explicit window-identity -> route registry; the single static
/// dispatch entry point recovers per-window state here instead of
/// through a pointer stashed in window userdata.
static ROUTES: Lazy<Mutex<HashMap<isize, Route>>> = Lazy::new(|| Mutex::new(HashMap::new()));

pub fn create_host(
    tx: UnboundedSender<TrayMessage>,
    menu: Arc<PopupMenu>,
    balloon_fallback: Duration,
) -> Result<HostHandles> {
    let balloon_timeout = Arc::new(Mutex::new(balloon_fallback));
    let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<isize>>();

    {
        let tx = tx.clone();
        let menu = menu.clone();
        let balloon_timeout = balloon_timeout.clone();
        std::thread::spawn(move || pump(tx, menu, balloon_timeout, ready_tx));
    }

    let hwnd = ready_rx
        .recv()
        .context("Tray window thread exited before reporting")??;
    let shell = Win32Shell::new(hwnd, balloon_timeout)?;

    Ok(HostHandles {
        host: Box::new(Win32Host { hwnd }),
        shell: Arc::new(shell),
    })
}

/// Registers the window class, creates the hidden window and runs the
/// message pump until the window is destroyed.
fn pump(
    tx: UnboundedSender<TrayMessage>,
    menu: Arc<PopupMenu>,
    balloon_timeout: Arc<Mutex<Duration>>,
    ready_tx: std::sync::mpsc::Sender<Result<isize>>,
) {
    unsafe {
        let instance = match GetModuleHandleW(None) {
            Ok(instance) => instance,
            Err(e) => {
                let _ = ready_tx.send(Err(e.into()));
                return;
            }
        };

        let class_name = w!("ApctrayMessageWindow");
        let wc = WNDCLASSW {
            lpfnWndProc: Some(wnd_proc),
            hInstance: instance.into(),
            lpszClassName: class_name,
            ..Default::default()
        };
        // Zero means the class already exists, which is fine.
        RegisterClassW(&wc);

        let hwnd = match CreateWindowExW(
            WINDOW_EX_STYLE(0),
            class_name,
            w!("Apcupsd Tray"),
            WINDOW_STYLE(0),
            0,
            0,
            0,
            0,
            None,
            None,
            Some(instance.into()),
            None,
        ) {
            Ok(hwnd) => hwnd,
            Err(e) => {
                let _ = ready_tx.send(Err(e.into()));
                return;
            }
        };

        let key = hwnd.0 as isize;
        ROUTES.lock().unwrap().insert(
            key,
            Route {
                tx,
                menu,
                balloon_timeout,
            },
        );
        let _ = ready_tx.send(Ok(key));

        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }

        ROUTES.lock().unwrap().remove(&key);
    }
}

unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let key = hwnd.0 as isize;

    match msg {
        CALLBACK_MESSAGE => {
            match lparam.0 as u32 {
                WM_RBUTTONUP => send_to(key, TrayMessage::IconRightClick),
                WM_LBUTTONDBLCLK => send_to(key, TrayMessage::IconDoubleClick),
                NIN_BALLOONSHOW => {
                    let timeout = ROUTES
                        .lock()
                        .unwrap()
                        .get(&key)
                        .map(|route| *route.balloon_timeout.lock().unwrap());
                    if let Some(timeout) = timeout {
                        send_to(key, TrayMessage::BalloonShown { timeout });
                    }
                }
                _ => {}
            }
            LRESULT(0)
        }

        WM_COMMAND => {
            let id = (wparam.0 & 0xffff) as u32;
            if let Some(command) = MenuCommand::from_id(id) {
                send_to(key, TrayMessage::Menu(command));
            }
            LRESULT(0)
        }

        WM_SHOWMENU => {
            let menu = ROUTES
                .lock()
                .unwrap()
                .get(&key)
                .map(|route| route.menu.clone());
            if let Some(menu) = menu {
                track_menu(hwnd, &menu);
            }
            LRESULT(0)
        }

        WM_CLOSE => {
            send_to(key, TrayMessage::CloseRequested);
            // Default handling destroys the window.
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }

        WM_DESTROY => {
            send_to(key, TrayMessage::Destroyed);
            PostQuitMessage(0);
            LRESULT(0)
        }

        WM_QUERYENDSESSION => {
            let logging_off = (lparam.0 as u32) & ENDSESSION_LOGOFF != 0;
            send_to(key, TrayMessage::SessionEnding { logging_off });
            // Acknowledge the query as handled either way.
            LRESULT(1)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

fn send_to(key: isize, message: TrayMessage) {
    if let Some(route) = ROUTES.lock().unwrap().get(&key) {
        let _ = route.tx.send(message);
    }
}

/// Builds the popup from the menu model and runs it at the cursor. The
/// selection comes back to the owner window as `WM_COMMAND`, re-entering
/// the dispatcher on the same path as every other command.
unsafe fn track_menu(hwnd: HWND, menu: &PopupMenu) {
    let Ok(hmenu) = CreatePopupMenu() else {
        return;
    };

    for entry in menu.entries() {
        let flags = if menu.is_enabled(entry.command) {
            MF_STRING
        } else {
            MF_STRING | MF_GRAYED
        };
        let label = to_wide(entry.label);
        let _ = AppendMenuW(hmenu, flags, entry.command.id() as usize, PCWSTR(label.as_ptr()));
    }

    // Item 0 rendered bold as the double-click default.
    let _ = SetMenuDefaultItem(hmenu, 0, true);

    let mut cursor = POINT::default();
    let _ = GetCursorPos(&mut cursor);

    // Without this the popup does not dismiss when the user clicks
    // elsewhere (MSDN Q135788).
    let _ = SetForegroundWindow(hwnd);

    let _ = TrackPopupMenu(
        hmenu,
        TPM_LEFTALIGN | TPM_BOTTOMALIGN | TPM_RIGHTBUTTON,
        cursor.x,
        cursor.y,
        None,
        hwnd,
        None,
    );

    let _ = DestroyMenu(hmenu);
}

struct Win32Host {
    hwnd: isize,
}

impl Win32Host {
    fn hwnd(&self) -> HWND {
        HWND(self.hwnd as *mut c_void)
    }
}

impl TrayHost for Win32Host {
    fn show_menu(&self) -> Result<()> {
        unsafe {
            PostMessageW(Some(self.hwnd()), WM_SHOWMENU, WPARAM(0), LPARAM(0))
                .context("Posting popup menu request failed")
        }
    }

    fn request_close(&self) {
        unsafe {
            let _ = PostMessageW(Some(self.hwnd()), WM_CLOSE, WPARAM(0), LPARAM(0));
        }
    }
}

impl Drop for Win32Host {
    fn drop(&mut self) {
        // Best-effort: tears the pump down if the window is still alive.
        self.request_close();
    }
}

/// `Shell_NotifyIconW` backend with the four status glyphs preloaded at
/// construction.
struct Win32Shell {
    hwnd: isize,
    icons: Vec<(Glyph, isize)>,
    balloon_timeout: Arc<Mutex<Duration>>,
}

impl Win32Shell {
    fn new(hwnd: isize, balloon_timeout: Arc<Mutex<Duration>>) -> Result<Self> {
        let glyphs = [
            Glyph::Online,
            Glyph::OnBattery,
            Glyph::Charging,
            Glyph::CommLost,
        ];
        let mut icons = Vec::with_capacity(glyphs.len());
        for glyph in glyphs {
            icons.push((glyph, build_glyph_icon(glyph)?.0 as isize));
        }

        Ok(Self {
            hwnd,
            icons,
            balloon_timeout,
        })
    }

    fn icon_for(&self, glyph: Glyph) -> HICON {
        let handle = self
            .icons
            .iter()
            .find(|(g, _)| *g == glyph)
            .map(|(_, handle)| *handle)
            .unwrap_or(0);
        HICON(handle as *mut c_void)
    }
}

impl Shell for Win32Shell {
    fn notify(&self, op: ShellOp, request: &ShellRequest) -> Result<()> {
        let mut nid = NOTIFYICONDATAW {
            cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: HWND(self.hwnd as *mut c_void),
            uID: request.id,
            ..Default::default()
        };

        let mut flags = NOTIFY_ICON_DATA_FLAGS(0);
        if request.has_flag(shell::flags::MESSAGE) {
            flags |= NIF_MESSAGE;
            nid.uCallbackMessage = request.callback.unwrap_or(CALLBACK_MESSAGE);
        }
        if request.has_flag(shell::flags::ICON) {
            flags |= NIF_ICON;
            if let Some(glyph) = request.glyph {
                nid.hIcon = self.icon_for(glyph);
            }
        }
        if request.has_flag(shell::flags::TIP) {
            flags |= NIF_TIP;
            if let Some(tooltip) = &request.tooltip {
                fill_wide(&mut nid.szTip, tooltip);
            }
        }
        if request.has_flag(shell::flags::INFO) {
            flags |= NIF_INFO;
            if let Some(balloon) = &request.balloon {
                fill_wide(&mut nid.szInfoTitle, &balloon.title);
                fill_wide(&mut nid.szInfo, &balloon.body);
                nid.Anonymous.uTimeout = balloon.timeout.as_millis() as u32;
                if !balloon.is_clear() {
                    *self.balloon_timeout.lock().unwrap() = balloon.timeout;
                }
            }
        }
        nid.uFlags = flags;

        let nim: NOTIFY_ICON_MESSAGE = match op {
            ShellOp::Add => NIM_ADD,
            ShellOp::Modify => NIM_MODIFY,
            ShellOp::Delete => NIM_DELETE,
        };

        let ok = unsafe { Shell_NotifyIconW(nim, &nid) };
        if ok.as_bool() {
            Ok(())
        } else {
            Err(anyhow!("Shell_NotifyIconW {:?} failed", op))
        }
    }
}

fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

fn fill_wide(dst: &mut [u16], src: &str) {
    for (i, unit) in src.encode_utf16().enumerate() {
        if i >= dst.len() - 1 {
            break;
        }
        dst[i] = unit;
    }
}

/// Builds one 32x32 ARGB icon from in-code pixel art; no resource files
/// to load.
fn build_glyph_icon(glyph: Glyph) -> Result<HICON> {
    let bgra = render_glyph(glyph);
    let mask_bits = vec![0u8; (ICON_SIZE * ICON_SIZE / 8) as usize];

    unsafe {
        let color: HBITMAP = CreateBitmap(
            ICON_SIZE,
            ICON_SIZE,
            1,
            32,
            Some(bgra.as_ptr() as *const c_void),
        );
        let mask: HBITMAP = CreateBitmap(
            ICON_SIZE,
            ICON_SIZE,
            1,
            1,
            Some(mask_bits.as_ptr() as *const c_void),
        );

        let info = ICONINFO {
            fIcon: true.into(),
            xHotspot: 0,
            yHotspot: 0,
            hbmMask: mask,
            hbmColor: color,
        };
        let icon = CreateIconIndirect(&info);

        let _ = DeleteObject(color.into());
        let _ = DeleteObject(mask.into());

        icon.context("Creating tray glyph failed")
    }
}

/// Battery pictogram, colored and filled per power state; comm-lost is
/// slashed out.
fn render_glyph(glyph: Glyph) -> Vec<u8> {
    let size = ICON_SIZE as usize;
    let mut bgra = vec![0u8; size * size * 4];

    let (color, level) = match glyph {
        Glyph::Online => ((46u8, 204u8, 113u8), 1.0f32),
        Glyph::Charging => ((241, 196, 15), 0.6),
        Glyph::OnBattery => ((231, 76, 60), 0.3),
        Glyph::CommLost => ((149, 165, 166), 1.0),
    };
    let outline = (52u8, 73u8, 94u8);

    let mut put = |x: usize, y: usize, (r, g, b): (u8, u8, u8)| {
        let i = (y * size + x) * 4;
        bgra[i] = b;
        bgra[i + 1] = g;
        bgra[i + 2] = r;
        bgra[i + 3] = 255;
    };

    // Terminal cap and body outline.
    for y in 4..8 {
        for x in 12..20 {
            put(x, y, outline);
        }
    }
    for y in 8..29 {
        for x in 7..25 {
            let edge = y == 8 || y == 28 || x == 7 || x == 24;
            if edge {
                put(x, y, outline);
            }
        }
    }

    // Charge fill, bottom-up.
    let interior_top = 9usize;
    let interior_bottom = 28usize;
    let fill_rows = ((interior_bottom - interior_top) as f32 * level) as usize;
    for y in (interior_bottom - fill_rows)..interior_bottom {
        for x in 8..24 {
            put(x, y, color);
        }
    }

    if glyph == Glyph::CommLost {
        // Diagonal slash across the body.
        for t in 0..22 {
            let x = 6 + t;
            let y = 6 + t;
            if x < size - 2 && y < size - 2 {
                put(x, y, (192, 57, 43));
                put(x + 1, y, (192, 57, 43));
            }
        }
    }

    bgra
}
