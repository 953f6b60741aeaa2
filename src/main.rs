//! Solar Raster viewer
//!
//! Renders the orbit demo (or a RON scene given on the command line) on the
//! CPU and blits each frame to the window.
//!
//! Keys:
//! - G: toggle Gouraud / Phong shading
//! - B: toggle Phong / Blinn-Phong specular
//! - Space: pause the orbit

use macroquad::prelude::*;
use solar_raster::rasterizer::{self, Device, RenderSettings, Scene, HEIGHT, WIDTH};
use solar_raster::world::{demo_scene, load_scene, OrbitAnimation, ORBIT_RADIUS, ORBIT_SPEED};
use solar_raster::VERSION;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Solar Raster v{}", VERSION),
        window_width: WIDTH as i32 * 2,
        window_height: HEIGHT as i32 * 2,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Scene and settings from the first argument, or the demo
fn initial_scene() -> (Scene, RenderSettings) {
    let Some(path) = std::env::args().nth(1) else {
        return (demo_scene(), RenderSettings::default());
    };

    match load_scene(&path).and_then(|desc| Ok((desc.build()?, desc.settings))) {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("Failed to load scene {}: {}, falling back to the demo", path, e);
            (demo_scene(), RenderSettings::default())
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let (mut scene, mut settings) = initial_scene();
    let mut orbit = OrbitAnimation::new("earth", ORBIT_RADIUS, ORBIT_SPEED);
    let mut paused = false;
    let mut device = Device::new(WIDTH, HEIGHT);

    loop {
        if is_key_pressed(KeyCode::G) {
            settings.shading = settings.shading.toggled();
            log::info!("Shading: {}", settings.shading.label());
        }
        if is_key_pressed(KeyCode::B) {
            settings.specular = settings.specular.toggled();
            log::info!("Specular: {}", settings.specular.label());
        }
        if is_key_pressed(KeyCode::Space) {
            paused = !paused;
        }

        if !paused {
            orbit.advance(get_frame_time());
        }
        orbit.apply(&mut scene);

        clear_background(Color::from_rgba(30, 30, 35, 255));

        device.clear(rasterizer::Color::BLACK);
        let rendered = scene
            .prepare()
            .map_err(rasterizer::RenderError::from)
            .and_then(|_| device.render(&scene, &settings));
        if let Err(e) = rendered {
            log::error!("Render failed: {}", e);
        }
        let frame = device.present();

        // Draw framebuffer to screen, letterboxed to keep the aspect ratio
        let fb_texture = Texture2D::from_rgba8(frame.width as u16, frame.height as u16, &frame.pixels);
        fb_texture.set_filter(FilterMode::Nearest);

        let scale = (screen_width() / frame.width as f32).min(screen_height() / frame.height as f32);
        let (w, h) = (frame.width as f32 * scale, frame.height as f32 * scale);
        draw_texture_ex(
            &fb_texture,
            ((screen_width() - w) / 2.0).floor(),
            ((screen_height() - h) / 2.0).floor(),
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(w, h)),
                ..Default::default()
            },
        );

        let status = format!(
            "{} fps | [G] {} shading | [B] {} specular",
            get_fps(),
            settings.shading.label(),
            settings.specular.label()
        );
        draw_text(&status, 10.0, 22.0, 20.0, WHITE);

        next_frame().await;
    }
}
