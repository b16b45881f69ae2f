use std::collections::HashSet;
use std::ffi::{CString, NulError};
use std::mem::zeroed;
use std::os::raw::{c_long, c_uchar, c_ulong};
use std::ptr;

use log::{debug, trace};
use thiserror::Error;
use x11::xinerama;
use x11::xlib;

use crate::server::{Color, Keysym, ServerError, ServerEvent, WindowId, WindowServer, WorkArea};

pub struct X11Adapter {
    display: *mut xlib::Display,
    screen: i32,
    root: xlib::Window,
    gc: xlib::GC,
    wm_delete: xlib::Atom,
    closing: HashSet<WindowId>,
}

#[derive(Debug, Error)]
pub enum X11Error {
    #[error("display {0} not found")]
    DisplayNotFound(String),
    #[error("{0}")]
    NulString(#[from] NulError),
}

impl X11Adapter {
    pub fn new(display_name: &str) -> Result<Self, X11Error> {
        let display: *mut xlib::Display =
            unsafe { xlib::XOpenDisplay(CString::new(display_name)?.as_ptr()) };
        if display.is_null() {
            return Err(X11Error::DisplayNotFound(display_name.into()));
        }
        let (screen, root, gc, wm_delete) = unsafe {
            let screen = xlib::XDefaultScreen(display);
            (
                screen,
                xlib::XRootWindow(display, screen),
                xlib::XDefaultGC(display, screen),
                xlib::XInternAtom(
                    display,
                    b"WM_DELETE_WINDOW\0".as_ptr() as *const _,
                    xlib::False,
                ),
            )
        };
        Ok(X11Adapter {
            display,
            screen,
            root,
            gc,
            wm_delete,
            closing: HashSet::new(),
        })
    }

    /// `_NET_WORKAREA` on the root window, published by EWMH compliant
    /// window managers. Format 32 properties come back as native longs.
    fn net_workarea(&self) -> Option<WorkArea> {
        unsafe {
            let property = xlib::XInternAtom(
                self.display,
                b"_NET_WORKAREA\0".as_ptr() as *const _,
                xlib::True,
            );
            if property == 0 {
                return None;
            }
            let mut actual_type: xlib::Atom = 0;
            let mut actual_format = 0;
            let mut nitems: c_ulong = 0;
            let mut bytes_after: c_ulong = 0;
            let mut prop: *mut c_uchar = ptr::null_mut();
            let status = xlib::XGetWindowProperty(
                self.display,
                self.root,
                property,
                0,
                4,
                xlib::False,
                xlib::XA_CARDINAL,
                &mut actual_type,
                &mut actual_format,
                &mut nitems,
                &mut bytes_after,
                &mut prop,
            );
            if status != xlib::Success as i32 || prop.is_null() {
                return None;
            }
            if nitems < 4 || actual_format != 32 {
                xlib::XFree(prop as *mut _);
                return None;
            }
            let values = std::slice::from_raw_parts(prop as *const c_long, 4);
            let area = WorkArea {
                x: values[0] as i32,
                y: values[1] as i32,
                width: values[2] as u32,
                height: values[3] as u32,
            };
            xlib::XFree(prop as *mut _);
            (area.width > 0 && area.height > 0).then_some(area)
        }
    }

    fn xinerama_screen(&self) -> Option<WorkArea> {
        unsafe {
            if xinerama::XineramaIsActive(self.display) == 0 {
                return None;
            }
            let mut num = 0;
            let screens = xinerama::XineramaQueryScreens(self.display, &mut num);
            if screens.is_null() || num == 0 {
                return None;
            }
            let first = &*screens;
            let area = WorkArea {
                x: first.x_org as i32,
                y: first.y_org as i32,
                width: first.width as u32,
                height: first.height as u32,
            };
            xlib::XFree(screens as *mut _);
            Some(area)
        }
    }
}

impl WindowServer for X11Adapter {
    fn work_area(&mut self) -> WorkArea {
        if let Some(area) = self.net_workarea() {
            trace!("work area from _NET_WORKAREA");
            return area;
        }
        if let Some(area) = self.xinerama_screen() {
            trace!("work area from xinerama");
            return area;
        }
        // last resort: the full display resolution
        unsafe {
            WorkArea {
                x: 0,
                y: 0,
                width: xlib::XDisplayWidth(self.display, self.screen) as u32,
                height: xlib::XDisplayHeight(self.display, self.screen) as u32,
            }
        }
    }

    fn create_window(
        &mut self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        title: &str,
        color: Color,
    ) -> Result<WindowId, ServerError> {
        let title = CString::new(title)?;
        let window = unsafe {
            let window = xlib::XCreateSimpleWindow(
                self.display,
                self.root,
                x,
                y,
                width,
                height,
                0,
                xlib::XBlackPixel(self.display, self.screen),
                color.to_pixel() as c_ulong,
            );
            xlib::XStoreName(self.display, window, title.as_ptr());
            xlib::XSelectInput(
                self.display,
                window,
                xlib::KeyPressMask | xlib::StructureNotifyMask,
            );
            let mut protocols = [self.wm_delete];
            xlib::XSetWMProtocols(self.display, window, protocols.as_mut_ptr(), 1);
            xlib::XMapRaised(self.display, window);
            window
        };
        trace!(
            "created window {} at ({}, {}) {}x{}",
            window,
            x,
            y,
            width,
            height
        );
        Ok(window)
    }

    fn move_window(&mut self, window: WindowId, x: i32, y: i32) {
        unsafe { xlib::XMoveWindow(self.display, window, x, y) };
    }

    fn resize_window(&mut self, window: WindowId, width: u32, height: u32) {
        unsafe { xlib::XResizeWindow(self.display, window, width, height) };
    }

    fn poll_events(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        unsafe {
            while xlib::XPending(self.display) > 0 {
                let mut event: xlib::XEvent = zeroed();
                xlib::XNextEvent(self.display, &mut event);
                match event.get_type() {
                    xlib::KeyPress => {
                        // converting event to good type
                        let mut event: xlib::XKeyEvent = From::from(event);
                        let keysym = xlib::XLookupKeysym(&mut event, 0);
                        events.push(ServerEvent::KeyPress(keysym as Keysym));
                    }
                    xlib::ClientMessage => {
                        let event: xlib::XClientMessageEvent = From::from(event);
                        if event.data.get_long(0) as xlib::Atom == self.wm_delete {
                            debug!("close requested for window {}", event.window);
                            self.closing.insert(event.window);
                            events.push(ServerEvent::CloseRequested(event.window));
                        }
                    }
                    _ => continue,
                }
            }
        }
        events
    }

    fn should_close(&self, window: WindowId) -> bool {
        self.closing.contains(&window)
    }

    fn fill_window(&mut self, window: WindowId, width: u32, height: u32, color: Color) {
        unsafe {
            xlib::XSetForeground(self.display, self.gc, color.to_pixel() as c_ulong);
            xlib::XFillRectangle(self.display, window, self.gc, 0, 0, width, height);
        }
    }

    fn present(&mut self, _window: WindowId) {
        unsafe { xlib::XFlush(self.display) };
    }

    fn destroy_window(&mut self, window: WindowId) {
        trace!("destroying window {}", window);
        self.closing.remove(&window);
        unsafe { xlib::XDestroyWindow(self.display, window) };
    }
}

impl Drop for X11Adapter {
    fn drop(&mut self) {
        unsafe { xlib::XCloseDisplay(self.display) };
    }
}
