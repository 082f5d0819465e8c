//! The `minifb` window: presents a [`Framebuffer`] and reports input.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::input::{command_for_key, Command, COMMAND_KEYS};

pub const TITLE: &str = "Swarm - landmark particles";
pub const TARGET_FPS: usize = 60;

pub struct Visualizer {
    window:     Window,
    mouse_down: bool,
}

impl Visualizer {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            TITLE,
            width,
            height,
            WindowOptions { resize: true, ..WindowOptions::default() },
        )?;
        window.set_target_fps(TARGET_FPS);
        Ok(Visualizer { window, mouse_down: false })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Inner size in pixels.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Commands for keys that went down since the last frame.
    pub fn commands(&self) -> Vec<Command> {
        COMMAND_KEYS
            .iter()
            .filter(|&&k| self.window.is_key_pressed(k, KeyRepeat::No))
            .filter_map(|&k| command_for_key(k))
            .collect()
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.window.is_key_down(key)
    }

    /// Pointer position in window pixels, when it is over the window.
    pub fn mouse(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Discard)
    }

    /// `true` once per left-button press.
    pub fn take_click(&mut self) -> bool {
        let down = self.window.get_mouse_down(MouseButton::Left);
        let clicked = down && !self.mouse_down;
        self.mouse_down = down;
        clicked
    }

    pub fn present(&mut self, frame: &Framebuffer) -> Result<()> {
        self.window.update_with_buffer(frame.pixels(), frame.width(), frame.height())?;
        Ok(())
    }
}
