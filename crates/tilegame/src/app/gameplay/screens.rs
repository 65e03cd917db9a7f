use tilecore::{Canvas, DrawCall, PixelRect, Rgba};

const MENU_BACKGROUND: Rgba = Rgba::rgb(24, 20, 36);
const LOADING_BACKGROUND: Rgba = Rgba::rgb(8, 8, 8);
const GAME_OVER_BACKGROUND: Rgba = Rgba::rgb(48, 8, 12);

pub(crate) const MENU_CAPTION: &str = "click to start";
pub(crate) const LOADING_CAPTION: &str = "loading";
pub(crate) const GAME_OVER_CAPTION: &str = "game over - click to return";

/// Full-window backdrop with one centred caption.
fn title_card(canvas: &mut dyn Canvas, window_size: (u32, u32), color: Rgba, caption: &str) {
    let (width, height) = (window_size.0 as i32, window_size.1 as i32);
    canvas.draw(DrawCall::Panel {
        rect: PixelRect::new(0, 0, width, height),
        color,
    });
    canvas.draw(DrawCall::Caption {
        text: caption.to_string(),
        rect: PixelRect::new(width / 4, height * 2 / 5, width / 2, height / 5),
    });
}

pub(crate) fn render_menu(canvas: &mut dyn Canvas, window_size: (u32, u32)) {
    title_card(canvas, window_size, MENU_BACKGROUND, MENU_CAPTION);
}

pub(crate) fn render_loading(canvas: &mut dyn Canvas, window_size: (u32, u32)) {
    title_card(canvas, window_size, LOADING_BACKGROUND, LOADING_CAPTION);
}

pub(crate) fn render_game_over(canvas: &mut dyn Canvas, window_size: (u32, u32)) {
    title_card(canvas, window_size, GAME_OVER_BACKGROUND, GAME_OVER_CAPTION);
}
