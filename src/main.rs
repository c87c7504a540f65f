use indicatif::{ProgressBar, ProgressStyle};
use richards_wolf_psf::{airy_radius, Accuracy, Grid, Liveness, OpticalParameters, RichardsWolf};
use std::sync::Mutex;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "rwpsf", about = "Richards & Wolf vectorial point-spread function")]
struct Opt {
    /// Refractive index of the immersion medium
    #[structopt(long, default_value = "1.5")]
    ni: f64,
    /// Refractive index of the specimen [default: ni]
    #[structopt(long)]
    ns: Option<f64>,
    /// Refractive index of the coverslip [default: ni]
    #[structopt(long)]
    ng: Option<f64>,
    /// Numerical aperture of the objective
    #[structopt(long, default_value = "1.4")]
    na: f64,
    /// Emission wavelength [nm]
    #[structopt(short, long, default_value = "600")]
    wavelength: f64,
    /// Axial position of the point source [nm]
    #[structopt(long, default_value = "0")]
    particle: f64,
    #[structopt(long, default_value = "128")]
    nx: usize,
    #[structopt(long, default_value = "128")]
    ny: usize,
    #[structopt(long, default_value = "65")]
    nz: usize,
    /// Lateral pixel pitch [nm]
    #[structopt(long, default_value = "100")]
    res_lateral: f64,
    /// Axial plane spacing [nm]
    #[structopt(long, default_value = "250")]
    res_axial: f64,
    /// Integration accuracy: draft, good, better or best
    #[structopt(short, long, default_value = "good")]
    accuracy: Accuracy,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut optics = OpticalParameters::new(opt.ni, opt.na, opt.wavelength * 1e-9)?
        .with_accuracy(opt.accuracy)
        .with_particle_position(opt.particle * 1e-9);
    if let Some(ns) = opt.ns {
        optics = optics.with_specimen_index(ns)?;
    }
    if let Some(ng) = opt.ng {
        optics = optics.with_coverslip_index(ng)?;
    }
    let grid = Grid::new(opt.nx, opt.ny, opt.nz, opt.res_lateral, opt.res_axial);
    let rw = RichardsWolf::new(optics, grid)?;

    println!("{}", RichardsWolf::FULL_NAME);
    println!(
        "Airy radius: {:.1}nm ({:.2} px)",
        airy_radius(opt.na, opt.wavelength),
        airy_radius(opt.na, opt.wavelength) / opt.res_lateral
    );

    let pb = ProgressBar::new(100);
    pb.set_style(ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos:>3}% {msg}")?);
    let progress = Mutex::new(0.0);
    let monitor = |percent: f64, label: &str| {
        if let Ok(mut total) = progress.lock() {
            *total += percent;
            pb.set_position(total.round() as u64);
        }
        pb.set_message(label.to_string());
    };

    let volume = rw.generate(&Liveness::new(), &monitor);
    pb.finish_and_clear();

    println!("{:>5} {:>12} {:>14} {:>14}", "z", "defocus[nm]", "peak", "integral");
    for z in 0..grid.nz {
        let ((y, x), peak) = volume.peak(z);
        println!(
            "{:>5} {:>12.1} {:>14.6e} {:>14.6e}  ({}, {})",
            z,
            grid.defocus(z) * 1e9,
            peak,
            volume.intensity_integral(z),
            y,
            x
        );
    }

    Ok(())
}
