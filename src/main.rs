use anyhow::Context;
use clap::{Parser, ValueEnum};
use gridcast::game::{SKULL_MATERIAL, WALL_MATERIAL};
use gridcast::{
    DrawCmd, DrawList, Frame, FrameBuffer, Input, MoveConfig, RenderConfig, Rgb, TextureStore,
    World,
};
use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::rect::{Point, Rect};
use sdl2::render::{Canvas, TextureCreator, TextureQuery};
use sdl2::ttf::Font;
use sdl2::video::{Window, WindowContext};
use std::path::PathBuf;

// helper trait to convert strings into std::error types
trait StringToAnyhow<T> {
    fn ah(self) -> anyhow::Result<T>;
}

impl<T> StringToAnyhow<T> for Result<T, String> {
    fn ah(self) -> anyhow::Result<T> {
        self.map_err(|err| anyhow::anyhow!("{err}"))
    }
}

/// How finished frames reach the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Present {
    /// replay every pixel as a canvas draw call
    Points,
    /// upload the composed frame as one streaming texture
    Buffer,
}

/// First-person tile-grid raycaster.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Directory holding wall.ppm and skull.ppm
    #[arg(long, value_name = "DIR", default_value = "assets/textures")]
    assets: PathBuf,

    /// Window width in screen pixels
    #[arg(long, default_value_t = 960)]
    width: u32,

    /// Window height in screen pixels
    #[arg(long, default_value_t = 640)]
    height: u32,

    /// Rendered columns, one ray each
    #[arg(long, default_value_t = 320)]
    render_width: usize,

    /// Rendered rows
    #[arg(long, default_value_t = 200)]
    render_height: usize,

    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = 60.)]
    fov: f32,

    #[arg(long, value_enum, default_value_t = Present::Buffer)]
    present: Present,

    /// TrueType font for the frame-rate overlay; without one the figure is
    /// only logged
    #[arg(long, value_name = "TTF")]
    font: Option<PathBuf>,

    #[arg(long, default_value_t = 16)]
    font_size: u16,
}

fn color(rgb: Rgb) -> Color {
    Color::RGB(rgb.r, rgb.g, rgb.b)
}

/// draw `txt` at `point` on a padded background box
fn draw_text(
    canvas: &mut Canvas<Window>,
    texture_creator: &TextureCreator<WindowContext>,
    font: &Font<'_, '_>,
    txt: impl AsRef<str>,
    fg: Color,
    bg: Color,
    padding: (u32, u32),
    point: Point,
) -> anyhow::Result<()> {
    let texture = font
        .render(txt.as_ref())
        .solid(fg)?
        .as_texture(texture_creator)?;
    let TextureQuery { width, height, .. } = texture.query();

    canvas.set_draw_color(bg);
    canvas
        .fill_rect(Rect::new(
            point.x,
            point.y,
            width + (padding.0 * 2),
            height + (padding.1 * 2),
        ))
        .ah()?;
    let rect = Rect::new(
        point.x + padding.0 as i32,
        point.y + padding.1 as i32,
        width,
        height,
    );
    canvas.copy(&texture, None, rect).ah()?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_custom_env("GRIDCAST_LOG");
    let opts = Opts::parse();

    let config = RenderConfig {
        width: opts.render_width.max(1),
        height: opts.render_height.max(1),
        fov: opts.fov.clamp(1., 179.),
        ..Default::default()
    };

    // material id is the position in this list
    let mut names = ["", ""];
    names[WALL_MATERIAL] = "wall.ppm";
    names[SKULL_MATERIAL] = "skull.ppm";

    log::info!("loading textures from {}", opts.assets.display());
    let textures = TextureStore::load_dir(&opts.assets, &names, config.texture_size)
        .context("could not load textures")?;

    // sdl boilerplate
    log::info!("initializing sdl2");
    let sdl_ctx = sdl2::init().ah()?;
    log::info!("initializing video");
    let video = sdl_ctx.video().ah()?;

    log::info!("initializing window");
    let window = video
        .window("gridcast", opts.width, opts.height)
        .position_centered()
        .build()?;
    log::info!("creating canvas");
    let mut canvas = window.into_canvas().build()?;
    let texture_creator = canvas.texture_creator();

    log::info!("initializing font context");
    let font_ctx = sdl2::ttf::init()?;
    let font = match &opts.font {
        Some(path) => {
            log::info!("loading font {}", path.display());
            Some(font_ctx.load_font(path, opts.font_size).ah()?)
        }
        None => None,
    };

    sdl_ctx.mouse().set_relative_mouse_mode(true);
    log::info!("pumping events");
    let mut events = sdl_ctx.event_pump().ah()?;

    log::info!("initializing world");
    let mut world = World::default();
    let moves = MoveConfig::default();
    let mut frame = Frame::new(config);
    let (cols, rows) = (frame.config().width, frame.config().height);
    let mut buffer = FrameBuffer::new(cols, rows);
    let mut draws = DrawList::new(cols, rows);
    let mut screen =
        texture_creator.create_texture_streaming(PixelFormatEnum::RGB24, cols as u32, rows as u32)?;

    let scale = (
        opts.width as f32 / cols as f32,
        opts.height as f32 / rows as f32,
    );

    'main_loop: loop {
        let mut input = Input::default();

        // handle events
        for ev in events.poll_iter() {
            match ev {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'main_loop,
                Event::MouseMotion { xrel, .. } => input.look += xrel,
                _ => {}
            }
        }

        let keys = events.keyboard_state();
        input.forward = keys.is_scancode_pressed(Scancode::W);
        input.backward = keys.is_scancode_pressed(Scancode::S);

        frame.update(&mut world, &input, &moves);

        match opts.present {
            Present::Buffer => {
                frame.render(&mut buffer, &world, &textures);
                screen.update(None, buffer.pixels(), buffer.pitch())?;
                canvas.copy(&screen, None, None).ah()?;
            }
            Present::Points => {
                frame.render(&mut draws, &world, &textures);
                canvas.set_scale(scale.0, scale.1).ah()?;
                for cmd in draws.drain() {
                    match cmd {
                        DrawCmd::Point { x, y, color: c } => {
                            canvas.set_draw_color(color(c));
                            canvas.draw_point(Point::new(x as i32, y as i32)).ah()?;
                        }
                        DrawCmd::Rect {
                            x,
                            y,
                            w,
                            h,
                            color: c,
                        } => {
                            canvas.set_draw_color(color(c));
                            canvas
                                .fill_rect(Rect::new(x as i32, y as i32, w as u32, h as u32))
                                .ah()?;
                        }
                    }
                }
            }
        }

        if let Some(font) = &font {
            canvas.set_scale(1., 1.).ah()?;
            draw_text(
                &mut canvas,
                &texture_creator,
                font,
                frame.clock().label(),
                Color::WHITE,
                Color::BLACK,
                (4, 2),
                Point::new(8, 8),
            )?;
        }

        canvas.present();
    }

    log::info!("exiting after {:.1} fps", frame.clock().fps());
    Ok(())
}
