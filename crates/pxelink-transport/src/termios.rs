use std::fs::File;
use std::io;
use std::os::fd::AsRawFd;

/// Returns true if `file` refers to a terminal device.
pub(crate) fn is_tty(file: &File) -> bool {
    // SAFETY: the descriptor is open and owned by `file` for the duration of the call.
    unsafe { libc::isatty(file.as_raw_fd()) == 1 }
}

/// Map a numeric baud rate to its termios speed constant.
pub(crate) fn speed_for(baud: u32) -> Option<libc::speed_t> {
    let speed = match baud {
        9_600 => libc::B9600,
        19_200 => libc::B19200,
        38_400 => libc::B38400,
        57_600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        _ => return None,
    };
    Some(speed)
}

/// Put the terminal into raw 8N1 mode at `speed`, ignoring modem control lines.
pub(crate) fn configure_raw(file: &File, speed: libc::speed_t) -> io::Result<()> {
    let fd = file.as_raw_fd();

    // SAFETY: `termios` is plain old data; every field is overwritten by tcgetattr.
    let mut tio: libc::termios = unsafe { std::mem::zeroed() };

    // SAFETY: `fd` is an open terminal descriptor and `tio` is a valid writable termios.
    if unsafe { libc::tcgetattr(fd, &mut tio) } != 0 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: `tio` was initialized by tcgetattr above.
    unsafe { libc::cfmakeraw(&mut tio) };
    tio.c_cflag |= libc::CLOCAL | libc::CREAD;
    tio.c_cflag &= !(libc::CSTOPB | libc::PARENB);

    // SAFETY: `tio` is a valid termios and `speed` is a termios speed constant.
    let rc = unsafe { libc::cfsetispeed(&mut tio, speed) | libc::cfsetospeed(&mut tio, speed) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: `fd` is an open terminal descriptor and `tio` is fully initialized.
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &tio) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Block until everything written to the terminal has been transmitted.
pub(crate) fn drain(file: &File) -> io::Result<()> {
    // SAFETY: the descriptor is open and owned by `file` for the duration of the call.
    if unsafe { libc::tcdrain(file.as_raw_fd()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
