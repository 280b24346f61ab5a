//! Creates a sample sea-ice concentration NetCDF file for trying out IceTrend.
//!
//! Writes a coarse global grid with a seasonal ice cap in each hemisphere so
//! the extent/area charts show a visible annual cycle.

use ndarray::{Array1, Array3};
use netcdf::create;
use std::path::Path;

const N_YEARS: usize = 10;
const START_YEAR: i32 = 1990;
const NLAT: usize = 36;
const NLON: usize = 72;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = Path::new("sic_demo.nc");

    println!("🔨 Creating demo NetCDF file: {}", output_path.display());

    if output_path.exists() {
        std::fs::remove_file(output_path)?;
    }

    let mut file = create(output_path)?;

    file.add_attribute("title", "Synthetic sea-ice concentration")?;
    file.add_attribute("source_id", "DemoModel")?;
    file.add_attribute("created_by", "create_sic_netcdf.rs")?;

    let n_time = N_YEARS * 12;
    file.add_dimension("time", n_time)?;
    file.add_dimension("lat", NLAT)?;
    file.add_dimension("lon", NLON)?;

    {
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("units", format!("days since {}-01-01", START_YEAR))?;
        time_var.put_attribute("long_name", "time")?;
        time_var.put_attribute("calendar", "standard")?;

        // Mid-month offsets, 365-day years are close enough for a demo
        let time_data: Vec<f64> = (0..n_time).map(|i| i as f64 * 30.4375 + 15.0).collect();
        time_var.put(Array1::from(time_data).view(), ..)?;
    }

    let lat_data: Vec<f32> = (0..NLAT).map(|i| -87.5 + i as f32 * 5.0).collect();
    {
        let mut lat_var = file.add_variable::<f32>("lat", &["lat"])?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put_attribute("long_name", "latitude")?;
        lat_var.put(Array1::from(lat_data.clone()).view(), ..)?;
    }

    {
        let mut lon_var = file.add_variable::<f32>("lon", &["lon"])?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put_attribute("long_name", "longitude")?;
        let lon_data: Vec<f32> = (0..NLON).map(|i| 2.5 + i as f32 * 5.0).collect();
        lon_var.put(Array1::from(lon_data).view(), ..)?;
    }

    {
        let mut sic_var = file.add_variable::<f32>("sic", &["time", "lat", "lon"])?;
        sic_var.put_attribute("units", "%")?;
        sic_var.put_attribute("long_name", "sea ice area fraction")?;
        sic_var.put_attribute("_FillValue", -999.0f32)?;

        let mut sic = Array3::<f32>::zeros((n_time, NLAT, NLON));
        for t in 0..n_time {
            let month = (t % 12) as f32;
            // Northern ice edge swings between 60N (March) and 75N (September)
            let north_edge = 67.5 - 7.5 * ((month - 2.0) * std::f32::consts::PI / 6.0).cos();
            let south_edge = -(67.5 + 7.5 * ((month - 2.0) * std::f32::consts::PI / 6.0).cos());
            for (i, &lat) in lat_data.iter().enumerate() {
                let icy = lat >= north_edge || lat <= south_edge;
                if icy {
                    for j in 0..NLON {
                        sic[[t, i, j]] = 95.0;
                    }
                }
            }
            // Unobserved cells right at the pole, for --fill-pole-hole
            for j in 0..NLON {
                sic[[t, NLAT - 1, j]] = -999.0;
            }
        }
        sic_var.put(sic.view(), ..)?;
    }

    println!("✅ Wrote {} time steps on a {}x{} grid", n_time, NLAT, NLON);
    println!("💡 Try: ice_trend --region Arctic --month 9 sic_demo.nc");

    Ok(())
}
