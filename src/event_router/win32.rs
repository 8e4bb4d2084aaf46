//! Windows 后端: 在消息循环线程上创建一个 message-only 窗口

use std::{iter, mem, ptr};

use tracing::debug;
use winapi::{
    shared::{
        minwindef::{LPARAM, LRESULT, UINT, WPARAM},
        windef::HWND,
        winerror::ERROR_CLASS_ALREADY_EXISTS,
    },
    um::{
        errhandlingapi::GetLastError,
        libloaderapi::GetModuleHandleW,
        winuser::{
            CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GWLP_USERDATA,
            GetMessageW, GetWindowLongPtrW, HWND_MESSAGE, MSG, PostMessageW, RegisterClassExW,
            SetWindowLongPtrW, TranslateMessage, WM_QUIT, WNDCLASSEXW,
        },
    },
};

use super::Route;
use crate::{
    error::{BridgeError, Result},
    event_model::{EndpointHandle, NativeMessage},
};

const CLASS_NAME: &str = "WintabBridgeMessageWindow";
const WINDOW_TITLE: &str = "wintab-bridge message window";

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(iter::once(0)).collect()
}

pub(super) struct Endpoint {
    hwnd: HWND,
}

/// 必须在之后跑循环的线程上调用: 窗口属于创建它的线程
pub(super) fn create_endpoint() -> Result<Endpoint> {
    let class_name = wide(CLASS_NAME);
    let title = wide(WINDOW_TITLE);

    unsafe {
        let instance = GetModuleHandleW(ptr::null());
        let class = WNDCLASSEXW {
            cbSize: mem::size_of::<WNDCLASSEXW>() as UINT,
            style: 0,
            lpfnWndProc: Some(window_proc),
            cbClsExtra: 0,
            cbWndExtra: 0,
            hInstance: instance,
            hIcon: ptr::null_mut(),
            hCursor: ptr::null_mut(),
            hbrBackground: ptr::null_mut(),
            lpszMenuName: ptr::null(),
            lpszClassName: class_name.as_ptr(),
            hIconSm: ptr::null_mut(),
        };
        if RegisterClassExW(&class) == 0 {
            let code = GetLastError();
            if code != ERROR_CLASS_ALREADY_EXISTS {
                return Err(BridgeError::Endpoint(format!(
                    "RegisterClassExW failed with error {code}"
                )));
            }
        }

        let hwnd = CreateWindowExW(
            0,
            class_name.as_ptr(),
            title.as_ptr(),
            0,
            0,
            0,
            0,
            0,
            HWND_MESSAGE,
            ptr::null_mut(),
            instance,
            ptr::null_mut(),
        );
        if hwnd.is_null() {
            return Err(BridgeError::Endpoint(format!(
                "CreateWindowExW failed with error {}",
                GetLastError()
            )));
        }
        debug!(hwnd = hwnd as usize, "message window created");
        Ok(Endpoint { hwnd })
    }
}

impl Endpoint {
    pub(super) fn handle(&self) -> EndpointHandle {
        EndpointHandle(self.hwnd as usize)
    }

    pub(super) fn run(self, route: Route) {
        let route = Box::into_raw(Box::new(route));
        unsafe {
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, route as isize);
            let mut msg: MSG = mem::zeroed();
            while GetMessageW(&mut msg, ptr::null_mut(), 0, 0) > 0 {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
            drop(Box::from_raw(route));
            DestroyWindow(self.hwnd);
        }
        debug!(hwnd = self.hwnd as usize, "message window destroyed");
    }
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: UINT,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    // 在 run() 装好路由之前收到的消息 (WM_CREATE 之类) 直接交给默认处理
    let route = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *const Route;
    if !route.is_null() {
        let message = NativeMessage {
            endpoint: EndpointHandle(hwnd as usize),
            id: msg,
            wparam,
            lparam,
        };
        unsafe { (*route)(message) };
    }
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

pub(super) fn post_message(endpoint: EndpointHandle, id: u32, wparam: usize, lparam: isize) -> Result<()> {
    let posted = unsafe { PostMessageW(endpoint.0 as HWND, id, wparam, lparam) };
    if posted == 0 {
        return Err(BridgeError::Endpoint(format!(
            "PostMessageW failed with error {}",
            unsafe { GetLastError() }
        )));
    }
    Ok(())
}

/// 投递 `WM_QUIT`, `GetMessageW` 取到它之后 `run` 销毁窗口并返回
pub(super) fn close_endpoint(endpoint: EndpointHandle) {
    if unsafe { PostMessageW(endpoint.0 as HWND, WM_QUIT, 0, 0) } == 0 {
        debug!(?endpoint, "message window already gone");
    }
}
