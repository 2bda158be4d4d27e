use embedded_hal_async::{digital::Wait, spi::SpiDevice};

use super::gyro::Gyroscope;
use crate::gesture::sample::Sample;

const READ: u8 = 0x80;
const AUTO_INCREMENT: u8 = 0x40;

const CTRL_REG1: u8 = 0x20;
const CTRL_REG3: u8 = 0x22;
const CTRL_REG4: u8 = 0x23;
const OUT_X_L: u8 = 0x28;

// 190 Hz ODR, 50 Hz cut-off, normal mode, X/Y/Z on
const CTRL_REG1_CONFIG: u8 = 0b01_10_1_1_1_1;
// ±500 dps
const CTRL_REG4_CONFIG: u8 = 0b0_0_01_0_00_0;
// data-ready on INT2
const CTRL_REG3_CONFIG: u8 = 0b0_0_0_0_1_000;

const CONFIGURATION: [(u8, u8); 3] = [
    (CTRL_REG1, CTRL_REG1_CONFIG),
    (CTRL_REG4, CTRL_REG4_CONFIG),
    (CTRL_REG3, CTRL_REG3_CONFIG),
];

/// 17.5 mdps per digit at ±500 dps, converted to rad/s.
pub const SCALING_FACTOR: f32 = 17.5 * core::f32::consts::PI / 180.0 / 1000.0;

#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum L3gd20Error<S, P> {
    Spi(S),
    DataReady(P),
    NotAcknowledged { register: u8, expected: u8, actual: u8 },
}

/// L3GD20 / I3G4250D on SPI mode 3, with INT2 wired as the data-ready line.
pub struct L3gd20<S: SpiDevice, P: Wait> {
    spi: S,
    data_ready: P,
}

impl<S: SpiDevice, P: Wait> L3gd20<S, P> {
    pub fn new(spi: S, data_ready: P) -> Self {
        Self { spi, data_ready }
    }

    pub fn release(self) -> (S, P) {
        (self.spi, self.data_ready)
    }

    async fn write_register(
        &mut self,
        register: u8,
        value: u8,
    ) -> Result<(), L3gd20Error<S::Error, P::Error>> {
        self.spi
            .write(&[register, value])
            .await
            .map_err(L3gd20Error::Spi)
    }

    async fn read_register(&mut self, register: u8) -> Result<u8, L3gd20Error<S::Error, P::Error>> {
        let mut buffer = [register | READ, 0xFF];
        self.spi
            .transfer_in_place(&mut buffer)
            .await
            .map_err(L3gd20Error::Spi)?;
        Ok(buffer[1])
    }
}

impl<S: SpiDevice, P: Wait> Gyroscope for L3gd20<S, P> {
    type Error = L3gd20Error<S::Error, P::Error>;

    async fn configure(&mut self) -> Result<(), Self::Error> {
        for (register, expected) in CONFIGURATION {
            self.write_register(register, expected).await?;
            let actual = self.read_register(register).await?;
            if actual != expected {
                log_error!(
                    "L3GD20: register {} reads back {}, wrote {}",
                    register,
                    actual,
                    expected
                );
                return Err(L3gd20Error::NotAcknowledged {
                    register,
                    expected,
                    actual,
                });
            }
        }
        log_info!("L3GD20 configured");
        Ok(())
    }

    async fn read_sample(&mut self) -> Result<Sample, Self::Error> {
        // DRDY stays high until the output registers are read
        self.data_ready
            .wait_for_high()
            .await
            .map_err(L3gd20Error::DataReady)?;

        let mut buffer = [0xFFu8; 7];
        buffer[0] = OUT_X_L | READ | AUTO_INCREMENT;
        self.spi
            .transfer_in_place(&mut buffer)
            .await
            .map_err(L3gd20Error::Spi)?;

        Ok(decode_output_registers(&buffer[1..]))
    }
}

/// OUT_X_L..OUT_Z_H, little endian two's complement.
fn decode_output_registers(raw: &[u8]) -> Sample {
    let axis = |i: usize| i16::from_le_bytes([raw[i * 2], raw[i * 2 + 1]]) as f32 * SCALING_FACTOR;
    Sample::new(axis(0), axis(1), axis(2))
}
