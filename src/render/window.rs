use anyhow::Result;
use minifb::{Key, Window, WindowOptions};

use super::color::Color;
use super::plan::DrawPlan;
use super::raster::PixelCanvas;

/// minifbを使用したオーバーレイ表示
pub struct OverlayWindow {
    window: Window,
    canvas: PixelCanvas,
    background: Color,
}

impl OverlayWindow {
    /// ウィンドウを作成
    pub fn new(title: &str, width: usize, height: usize, background: Color) -> Result<Self> {
        let window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        Ok(Self {
            window,
            canvas: PixelCanvas::new(width, height, background),
            background,
        })
    }

    /// ウィンドウが開いているか
    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// 描画計画をバッファに描いて表示
    pub fn show(&mut self, plan: &DrawPlan) -> Result<()> {
        self.canvas.clear(self.background);
        plan.paint(&mut self.canvas);
        self.window
            .update_with_buffer(self.canvas.buffer(), self.canvas.width(), self.canvas.height())?;
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }
}
