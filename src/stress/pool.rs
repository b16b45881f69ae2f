use log::{error, info};
use rand::Rng;

use super::window::WindowRecord;
use crate::config::Config;
use crate::server::{Color, WindowServer, WorkArea};

/// Draw one rectangle with each side uniform in [min_size, max_size] and a
/// position uniform over the placements that keep it inside the work area.
fn random_rect<R: Rng>(rng: &mut R, config: &Config, area: &WorkArea) -> (i32, i32, u32, u32) {
    let width = rng.random_range(config.min_size..=config.max_size);
    let height = rng.random_range(config.min_size..=config.max_size);
    let x_span = (area.width as i64 - width as i64).max(1);
    let y_span = (area.height as i64 - height as i64).max(1);
    let x = area.x + rng.random_range(0..x_span) as i32;
    let y = area.y + rng.random_range(0..y_span) as i32;
    (x, y, width, height)
}

/// Create the initial window population. A creation failure is not fatal:
/// it is reported and the pool keeps whatever subset already exists.
pub fn create_pool<S: WindowServer, R: Rng>(
    server: &mut S,
    rng: &mut R,
    config: &Config,
    area: &WorkArea,
) -> Vec<WindowRecord> {
    let mut windows = Vec::with_capacity(config.window_count);
    for i in 0..config.window_count {
        let (x, y, width, height) = random_rect(rng, config, area);
        let color = Color {
            r: rng.random::<f32>(),
            g: rng.random::<f32>(),
            b: rng.random::<f32>(),
        };
        let title = format!("Window {}", i + 1);
        let id = match server.create_window(x, y, width, height, &title, color) {
            Ok(id) => id,
            Err(err) => {
                error!("failed to create window {}: {}", i + 1, err);
                break;
            }
        };
        // window managers are free to ignore the creation coordinates,
        // so position explicitly afterwards
        server.move_window(id, x, y);
        windows.push(WindowRecord {
            id,
            color,
            x,
            y,
            width,
            height,
        });
    }
    info!(
        "created {} of {} windows",
        windows.len(),
        config.window_count
    );
    windows
}

#[cfg(test)]
mod pool_tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::create_pool;
    use crate::config::Config;
    use crate::server::mock::MockServer;
    use crate::server::WorkArea;

    fn test_config(count: usize) -> Config {
        Config {
            window_count: count,
            ..Config::default()
        }
    }

    #[test]
    fn test_initial_layout_stays_in_bounds() {
        let area = WorkArea {
            x: 0,
            y: 0,
            width: 1000,
            height: 800,
        };
        let mut server = MockServer::new(area);
        let mut rng = StdRng::seed_from_u64(7);
        let windows = create_pool(&mut server, &mut rng, &test_config(50), &area);
        assert_eq!(windows.len(), 50);
        for win in &windows {
            assert!(win.width >= 80 && win.width <= 220);
            assert!(win.height >= 80 && win.height <= 220);
            assert!(win.x >= 0 && win.x <= 1000 - win.width as i32);
            assert!(win.y >= 0 && win.y <= 800 - win.height as i32);
        }
    }

    #[test]
    fn test_layout_respects_work_area_origin() {
        let area = WorkArea {
            x: 64,
            y: 32,
            width: 1200,
            height: 900,
        };
        let mut server = MockServer::new(area);
        let mut rng = StdRng::seed_from_u64(11);
        let windows = create_pool(&mut server, &mut rng, &test_config(40), &area);
        for win in &windows {
            assert!(win.x >= 64 && win.x <= 64 + 1200 - win.width as i32);
            assert!(win.y >= 32 && win.y <= 32 + 900 - win.height as i32);
        }
    }

    #[test]
    fn test_colors_in_unit_range() {
        let area = WorkArea {
            x: 0,
            y: 0,
            width: 1000,
            height: 800,
        };
        let mut server = MockServer::new(area);
        let mut rng = StdRng::seed_from_u64(3);
        for win in create_pool(&mut server, &mut rng, &test_config(20), &area) {
            assert!((0.0..1.0).contains(&win.color.r));
            assert!((0.0..1.0).contains(&win.color.g));
            assert!((0.0..1.0).contains(&win.color.b));
        }
    }

    #[test]
    fn test_creation_failure_keeps_subset() {
        let area = WorkArea {
            x: 0,
            y: 0,
            width: 1000,
            height: 800,
        };
        let mut server = MockServer::new(area);
        server.fail_after = Some(3);
        let mut rng = StdRng::seed_from_u64(5);
        let windows = create_pool(&mut server, &mut rng, &test_config(10), &area);
        // the fourth request fails, the first three survive
        assert_eq!(windows.len(), 3);
        assert_eq!(server.created.len(), 3);
    }

    #[test]
    fn test_creation_failure_on_first_window_gives_empty_pool() {
        let area = WorkArea {
            x: 0,
            y: 0,
            width: 1000,
            height: 800,
        };
        let mut server = MockServer::new(area);
        server.fail_after = Some(0);
        let mut rng = StdRng::seed_from_u64(5);
        let windows = create_pool(&mut server, &mut rng, &test_config(10), &area);
        assert!(windows.is_empty());
    }
}
