/// A single sampled video frame: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; the analysis layer
/// treats pixel data as opaque. `index` is the 0-based position of the
/// frame in the sampled stream, which doubles as a timestamp in seconds
/// when sampling at 1 fps.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * 3,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> usize {
        self.index
    }
}
