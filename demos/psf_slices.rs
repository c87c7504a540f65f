use image::{ImageBuffer, Rgb};
use ndarray::{s, Array2, ArrayView2, Axis};
use palette::{Lch, Srgb};
use richards_wolf_psf::{Accuracy, Grid, Liveness, OpticalParameters, RichardsWolf, Volume};

/// Dynamic range shown in the images, in decades below the peak.
const DECADES: f64 = 4.0;

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    let optics = OpticalParameters::new(1.5, 1.4, 600e-9)?
        .with_specimen_index(1.33)?
        .with_particle_position(2e-6)
        .with_accuracy(Accuracy::Better);
    let grid = Grid::new(96, 96, 49, 50.0, 100.0);
    let rw = RichardsWolf::new(optics, grid)?;

    let volume = rw.generate(&Liveness::new(), &|percent: f64, label: &str| {
        println!("{:>5.1}% plane {}", percent, label)
    });

    // focus and planes a quarter and a half of the stack away, each scaled to its own peak
    let focus = (grid.nz - 1) / 2;
    let planes = [focus, focus + grid.nz / 4, grid.nz - 1];
    save_png("psf_xy.png", montage(&volume, &planes).view())?;

    let xz = axial_section(&volume, grid.ny / 2);
    println!(
        "xz section {}x{} at {}nm per pixel",
        xz.ncols(),
        xz.nrows(),
        volume.pitch.0
    );
    save_png("psf_xz.png", decades(xz.view(), DECADES).view())?;

    Ok(())
}

/// Side by side log images of the given planes, each normalised to its own maximum
/// so the defocused planes stay visible.
fn montage(volume: &Volume, planes: &[usize]) -> Array2<f64> {
    let (ny, nx) = volume.plane(0).dim();
    let mut out = Array2::zeros((ny, nx * planes.len()));
    for (i, &z) in planes.iter().enumerate() {
        out.slice_mut(s![.., i * nx..(i + 1) * nx])
            .assign(&decades(volume.plane(z), DECADES));
    }
    out
}

/// XZ cut through row `y`, resampled along z so one pixel covers the lateral pitch in both directions.
fn axial_section(volume: &Volume, y: usize) -> Array2<f64> {
    let (lateral, axial) = volume.pitch;
    let cut = volume.values.index_axis(Axis(1), y);
    let nz = cut.nrows();
    let rows = ((nz - 1) as f64 * axial / lateral).round() as usize + 1;

    let mut out = Array2::zeros((rows, cut.ncols()));
    for (row, mut line) in out.outer_iter_mut().enumerate() {
        let z = ((row as f64 * lateral / axial).round() as usize).min(nz - 1);
        line.assign(&cut.row(z));
    }
    out
}

/// Maps intensity onto `[0, 1]` over `range` decades below the maximum.
fn decades(arr: ArrayView2<f64>, range: f64) -> Array2<f64> {
    let max = arr.iter().fold(0.0, |max, &v| v.max(max));
    if max <= 0.0 {
        return Array2::zeros(arr.raw_dim());
    }
    arr.map(|&v| ((v / max).log10() / range + 1.0).max(0.0).min(1.0))
}

fn save_png<P: AsRef<std::path::Path>>(path: P, arr: ArrayView2<f64>) -> Result<(), Box<dyn std::error::Error>> {
    let (h, w) = arr.dim();
    let img = ImageBuffer::from_fn(w as u32, h as u32, |x, y| {
        let value = arr[[y as usize, x as usize]];
        let colour = Srgb::from(Lch::new(value * 70.0, value * 128.0, 280.0 - 245.0 * value));
        Rgb([
            (colour.red * 255.0) as u8,
            (colour.green * 255.0) as u8,
            (colour.blue * 255.0) as u8,
        ])
    });
    img.save(path)?;
    Ok(())
}
