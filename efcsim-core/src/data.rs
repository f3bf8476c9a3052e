use crate::packet::Packet;

/// Anything flowing through the pipeline that occupies bandwidth.
///
/// The simulation never materialises the payloads, only their size in
/// bytes matters for the latency, processing and bandwidth models.
pub trait Data {
    /// the size of the content in bytes
    ///
    /// # case for `0` bytes data
    ///
    /// A `0` bytes packet is still transmitted: it only pays the base
    /// latency of the hop and costs no processing time.
    fn bytes_size(&self) -> u64;
}

impl Data for Packet {
    fn bytes_size(&self) -> u64 {
        self.size()
    }
}

impl<T: Data> Data for [T] {
    fn bytes_size(&self) -> u64 {
        self.iter().map(Data::bytes_size).sum()
    }
}

impl<T: Data> Data for Vec<T> {
    fn bytes_size(&self) -> u64 {
        self.as_slice().bytes_size()
    }
}
