use super::color::Color;
use super::mapper::ScreenPoint;
use super::plan::{LineSegment, PointMarker, Surface, TextLabel};

const GLYPH_WIDTH: i64 = 3;
const GLYPH_HEIGHT: i64 = 5;

/// 3x5 のビットマップ。角度ラベルに出てくる文字だけ持つ
fn glyph(c: char) -> Option<[u8; 5]> {
    Some(match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        _ => return None,
    })
}

/// ソフトウェアラスタライザ
///
/// 0x00RRGGBB のピクセルバッファに描画する (minifb と同じ形式)。
/// ラベルはビットマップ数字で描く。アンカーがベースライン左端。
pub struct PixelCanvas {
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl PixelCanvas {
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        Self {
            buffer: vec![rgb_u32(background); width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn buffer(&self) -> &[u32] {
        &self.buffer
    }

    pub fn clear(&mut self, background: Color) {
        self.buffer.fill(rgb_u32(background));
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.buffer[y * self.width + x])
        } else {
            None
        }
    }

    /// RGBA8 に変換 (PNG 書き出し用)
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.buffer
            .iter()
            .flat_map(|&p| [(p >> 16) as u8, (p >> 8) as u8, p as u8, 255])
            .collect()
    }

    /// 描画半径の上限。これ以上大きくしても見た目は変わらない
    fn max_radius(&self) -> i64 {
        (self.width + self.height) as i64 + 1
    }

    /// 点 (x, y) が半径 margin 以内でキャンバスにかかるか
    fn touches(&self, x: f64, y: f64, margin: f64) -> bool {
        x.is_finite()
            && y.is_finite()
            && x >= -margin
            && y >= -margin
            && x <= self.width as f64 - 1.0 + margin
            && y <= self.height as f64 - 1.0 + margin
    }

    /// Liang-Barsky で線分をキャンバス (margin だけ拡張) に切り詰める
    fn clip_segment(&self, from: ScreenPoint, to: ScreenPoint, margin: f64) -> Option<((f64, f64), (f64, f64))> {
        let (x0, y0) = (from.x as f64, from.y as f64);
        let (x1, y1) = (to.x as f64, to.y as f64);
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return None;
        }

        let (min_x, max_x) = (-margin, self.width as f64 - 1.0 + margin);
        let (min_y, max_y) = (-margin, self.height as f64 - 1.0 + margin);
        let dx = x1 - x0;
        let dy = y1 - y0;
        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;

        for (p, q) in [(-dx, x0 - min_x), (dx, max_x - x0), (-dy, y0 - min_y), (dy, max_y - y0)] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }

        Some(((x0 + t0 * dx, y0 + t0 * dy), (x0 + t1 * dx, y0 + t1 * dy)))
    }

    /// Bresenhamのアルゴリズムで線を描画。太さは各点に円を置いて表現する
    ///
    /// 端点はクリップ済みであること。
    fn draw_thick_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, radius: i64, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut x = x0;
        let mut y = y0;

        loop {
            if radius <= 1 {
                self.blend_pixel(x, y, color);
            } else {
                self.fill_circle(x, y, radius, color);
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// 円を描画（塗りつぶし）
    fn fill_circle(&mut self, cx: i64, cy: i64, radius: i64, color: Color) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.blend_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// 矩形を塗りつぶし。キャンバス外は切り捨てる
    fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Color) {
        let x_start = x.max(0);
        let y_start = y.max(0);
        let x_end = (x + w).min(self.width as i64);
        let y_end = (y + h).min(self.height as i64);
        for py in y_start..y_end {
            for px in x_start..x_end {
                self.blend_pixel(px, py, color);
            }
        }
    }

    fn draw_text(&mut self, anchor: ScreenPoint, text: &str, size: f32, color: Color) {
        let cell = ((size / GLYPH_HEIGHT as f32).round() as i64).clamp(1, self.max_radius());
        let advance = (GLYPH_WIDTH + 1) * cell;
        let text_width = text.chars().count() as f64 * advance as f64;
        let text_height = (GLYPH_HEIGHT * cell) as f64;
        let (x, y) = (anchor.x as f64, anchor.y as f64);

        // 全体がキャンバス外なら何もしない
        if !x.is_finite()
            || !y.is_finite()
            || x >= self.width as f64
            || x + text_width < 0.0
            || y < 0.0
            || y - text_height >= self.height as f64
        {
            return;
        }

        let left = x.round() as i64;
        let top = y.round() as i64 - GLYPH_HEIGHT * cell;

        for (i, c) in text.chars().enumerate() {
            let Some(rows) = glyph(c) else {
                continue;
            };
            let gx = left + i as i64 * advance;
            for (row, &bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (0b100u8 >> col) != 0 {
                        self.fill_rect(gx + col * cell, top + row as i64 * cell, cell, cell, color);
                    }
                }
            }
        }
    }

    /// アルファ付きで合成（境界チェック付き）
    fn blend_pixel(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || x >= self.width as i64 || y < 0 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.buffer[idx] = match color.a {
            255 => rgb_u32(color),
            0 => self.buffer[idx],
            _ => {
                let dst = Color::from_argb_u32(0xFF00_0000 | self.buffer[idx]);
                let src = Color::rgb(color.r, color.g, color.b);
                rgb_u32(dst.lerp(src, color.a as f32 / 255.0))
            }
        };
    }
}

impl Surface for PixelCanvas {
    fn draw_line(&mut self, line: &LineSegment) {
        let radius = ((line.width / 2.0).round() as i64).clamp(0, self.max_radius());
        let Some(((x0, y0), (x1, y1))) = self.clip_segment(line.from, line.to, radius as f64) else {
            return;
        };
        self.draw_thick_line(
            x0.round() as i64,
            y0.round() as i64,
            x1.round() as i64,
            y1.round() as i64,
            radius,
            line.color,
        );
    }

    fn draw_point(&mut self, point: &PointMarker) {
        let radius = ((point.size / 2.0).round() as i64).clamp(1, self.max_radius());
        let (x, y) = (point.position.x as f64, point.position.y as f64);
        if !self.touches(x, y, radius as f64) {
            return;
        }
        self.fill_circle(x.round() as i64, y.round() as i64, radius, point.color);
    }

    fn draw_label(&mut self, label: &TextLabel) {
        self.draw_text(label.anchor, &label.text, label.size, label.color);
    }
}

fn rgb_u32(color: Color) -> u32 {
    color.to_argb_u32() & 0x00FF_FFFF
}
