/// Hands out endpoint numbers in request order.
///
/// Numbers start at 0 and are shared by both directions; the direction bit is
/// added by the caller.
#[derive(Clone, Debug)]
pub struct EndpointAllocator {
    next: u8,
    max: u8,
}

/// Direction bit of an IN endpoint address.
pub const IN_DIRECTION: u8 = 0x80;

/// Endpoint numbers that fit below the direction bit.
pub const MAX_ENDPOINTS: u8 = IN_DIRECTION;

impl EndpointAllocator {
    /// An allocator for `max` numbers, capped at `MAX_ENDPOINTS`.
    pub fn new(max: u8) -> Self {
        Self {
            next: 0,
            max: max.min(MAX_ENDPOINTS),
        }
    }

    /// Reserve the next endpoint number, or `None` once `max` are taken.
    pub fn reserve(&mut self) -> Option<u8> {
        if self.next >= self.max {
            return None;
        }
        let number = self.next;
        self.next += 1;
        Some(number)
    }

    pub fn allocated(&self) -> u8 {
        self.next
    }

    pub fn max(&self) -> u8 {
        self.max
    }
}
