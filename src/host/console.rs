use digit_telemetry::{CoordinateStream, Presenter, ResultRecord};

/// Dark to bright.
const SHADES: &[u8] = b" .:-=+*#%@";

/// Terminal stand-in for the plotting window.
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    last_points: usize,
}

impl ConsolePresenter {
    pub fn new() -> ConsolePresenter {
        ConsolePresenter { last_points: 0 }
    }
}

impl Presenter for ConsolePresenter {
    fn show_coordinates(&mut self, stream: &CoordinateStream) {
        // Every tick rescans the whole buffer; only report growth
        if stream.len() == self.last_points {
            return;
        }
        self.last_points = stream.len();
        if let Some(last) = stream.pairs().last() {
            log::debug!("touch ({}, {})", last.x, last.y);
        }
        println!("{} points", stream.len());
    }

    fn show_result(&mut self, record: &ResultRecord) {
        self.last_points = 0;
        print!("{}", render_raster(record));
        println!("Neural Network Output: {:?}", record.output);
        println!("Predicted value: {}", record.label);
    }

    fn show_progress(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Two characters per cell so the digit keeps its aspect ratio. The last
/// row is printed first: the image is stored flipped for a bottom-up axis.
pub fn render_raster(record: &ResultRecord) -> String {
    let max = record.image.max();
    let scale = if max > 0.0 { max } else { 1.0 };
    let mut out = String::new();
    for row in record.image.rows().iter().rev() {
        for value in row {
            let level = (value.max(0.0) / scale * (SHADES.len() - 1) as f32).round() as usize;
            let c = SHADES[level.min(SHADES.len() - 1)] as char;
            out.push(c);
            out.push(c);
        }
        out.push('\n');
    }
    out
}
